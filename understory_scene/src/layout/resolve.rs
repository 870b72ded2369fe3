// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack layout resolution: measure bottom-up, arrange top-down.

use alloc::vec::Vec;

use kurbo::{Affine, Rect, Size};

use super::{Axis, StackAlign, StackAlignSelf, StackJustify, StackPositioning, StackSize};
use crate::tree::ElementTree;
use crate::types::ElementId;
use crate::util::transform_rect_bbox;

/// Drop the translation of an affine.
fn linear_part(tf: Affine) -> Affine {
    let [a, b, c, d, _, _] = tf.as_coeffs();
    Affine::new([a, b, c, d, 0.0, 0.0])
}

impl ElementTree {
    /// Whether `id` has a stack mode.
    pub fn is_stack_container(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|n| n.stack.mode.is_stack())
    }

    /// The stack container directly above `id` and its primary axis.
    pub(crate) fn stack_parent(&self, id: ElementId) -> Option<(ElementId, Axis)> {
        let parent = self.get(id)?.parent?;
        let axis = self.get(parent)?.stack.mode.primary_axis()?;
        Some((parent, axis))
    }

    /// Whether `id` takes part in its parent's flow.
    pub(crate) fn in_flow(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|n| {
            n.is_visible() && n.stack_child.positioning == StackPositioning::Auto
        })
    }

    /// Visible in-flow children of a container in flow order.
    pub fn flow_children(&self, id: ElementId) -> Vec<ElementId> {
        let Some(n) = self.get(id) else {
            return Vec::new();
        };
        let mut flow: Vec<ElementId> = n
            .children
            .iter()
            .copied()
            .filter(|c| self.in_flow(*c))
            .collect();
        if n.stack.reverse_z_index {
            flow.reverse();
        }
        flow
    }

    /// Children in paint order. Absolute children of a stack container paint last.
    ///
    /// The stored child order is left as is; only the returned list moves absolute children.
    pub fn paint_order(&self, id: ElementId) -> Vec<ElementId> {
        let Some(n) = self.get(id) else {
            return Vec::new();
        };
        if !n.stack.mode.is_stack() {
            return n.children.clone();
        }
        let (absolute, mut flow): (Vec<ElementId>, Vec<ElementId>) =
            n.children.iter().copied().partition(|c| {
                self.get(*c).is_some_and(|cn| {
                    cn.stack_child.positioning == StackPositioning::Absolute
                })
            });
        flow.extend(absolute);
        flow
    }

    /// The layout box of `id` in its parent's space.
    pub(crate) fn box_in_parent(&self, id: ElementId) -> Option<Rect> {
        let n = self.get(id)?;
        Some(transform_rect_bbox(n.transform, n.size.to_rect()))
    }

    /// The layout box of `id` ignoring its translation.
    fn unplaced_box(&self, id: ElementId) -> Rect {
        self.get(id).map_or(Rect::ZERO, |n| {
            transform_rect_bbox(linear_part(n.transform), n.size.to_rect())
        })
    }

    pub(crate) fn grows(&self, id: ElementId) -> bool {
        self.get(id)
            .is_some_and(|n| n.stack_child.primary_grow > 0.0)
    }

    pub(crate) fn stretches(&self, id: ElementId) -> bool {
        self.get(id)
            .is_some_and(|n| n.stack_child.align_self == StackAlignSelf::Stretch)
    }

    fn baseline_of(&self, id: ElementId) -> f64 {
        self.get(id)
            .map_or(0.0, |n| n.baseline.unwrap_or(n.size.height))
    }

    /// Highest element reachable from `id` through stack-container parents.
    pub(crate) fn layout_root(&self, id: ElementId) -> ElementId {
        let mut cur = id;
        while let Some((parent, _)) = self.stack_parent(cur) {
            cur = parent;
        }
        cur
    }

    pub(crate) fn run_pending_layout(&mut self) {
        let pending: Vec<ElementId> = self.layout_pending.drain().collect();
        let mut roots: Vec<ElementId> = pending
            .into_iter()
            .filter(|id| self.is_alive(*id))
            .map(|id| self.layout_root(id))
            .collect();
        roots.sort_by_key(|r| (self.get(*r).map_or(0, |n| n.level), *r));
        roots.dedup();
        let mut kept: Vec<ElementId> = Vec::new();
        for r in roots {
            if !kept.iter().any(|k| self.is_ancestor_or_self(*k, r)) {
                kept.push(r);
            }
        }
        for root in kept {
            self.layout_subtree(root);
        }
    }

    fn layout_subtree(&mut self, root: ElementId) {
        let containers: Vec<ElementId> = self
            .preorder(root)
            .into_iter()
            .filter(|id| self.is_stack_container(*id))
            .collect();
        if containers.is_empty() {
            return;
        }
        for &c in containers.iter().rev() {
            self.measure(c);
        }
        for &c in &containers {
            self.arrange(c);
        }
        tracing::debug!(?root, containers = containers.len(), "resolved auto layout");
    }

    /// Recompute hug dimensions of a container from its flow children.
    fn measure(&mut self, id: ElementId) {
        let Some(n) = self.get(id) else {
            return;
        };
        let props = n.stack;
        let Some(axis) = props.mode.primary_axis() else {
            return;
        };
        let cross = axis.cross();
        let mut size = n.size;
        let flow = self.flow_children(id);
        if flow.is_empty() {
            return;
        }
        let (p_start, p_end) = props.padding.along(axis);
        let (c_start, c_end) = props.padding.along(cross);

        if props.primary_sizing == StackSize::Hug && !flow.iter().any(|f| self.grows(*f)) {
            let sum: f64 = flow
                .iter()
                .map(|f| axis.extent(self.unplaced_box(*f).size()))
                .sum();
            let gaps = props.spacing * (flow.len() - 1) as f64;
            size = axis.with_extent(size, p_start + sum + gaps + p_end);
        }

        if props.counter_sizing == StackSize::Hug {
            let fixed: Vec<ElementId> = flow
                .iter()
                .copied()
                .filter(|f| !self.stretches(*f))
                .collect();
            if !fixed.is_empty() {
                let content = if props.counter_align == StackAlign::Baseline
                    && axis == Axis::Horizontal
                {
                    let above = fixed
                        .iter()
                        .map(|f| self.baseline_of(*f))
                        .fold(0.0, f64::max);
                    let below = fixed
                        .iter()
                        .map(|f| self.unplaced_box(*f).height() - self.baseline_of(*f))
                        .fold(0.0, f64::max);
                    above + below
                } else {
                    fixed
                        .iter()
                        .map(|f| cross.extent(self.unplaced_box(*f).size()))
                        .fold(0.0, f64::max)
                };
                size = cross.with_extent(size, c_start + content + c_end);
            }
        }
        self.write_size(id, size);
    }

    /// Size fill children and place every flow child of a container.
    fn arrange(&mut self, id: ElementId) {
        let Some(n) = self.get(id) else {
            return;
        };
        let props = n.stack;
        let Some(axis) = props.mode.primary_axis() else {
            return;
        };
        let cross = axis.cross();
        let size = n.size;
        let flow = self.flow_children(id);
        if flow.is_empty() {
            return;
        }
        let (p_start, p_end) = props.padding.along(axis);
        let (c_start, c_end) = props.padding.along(cross);
        let inner_primary = axis.extent(size) - p_start - p_end;
        let inner_counter = cross.extent(size) - c_start - c_end;
        let gaps = props.spacing * (flow.len() - 1) as f64;

        let growers: Vec<ElementId> = flow.iter().copied().filter(|f| self.grows(*f)).collect();
        if !growers.is_empty() {
            let fixed: f64 = flow
                .iter()
                .filter(|f| !growers.contains(f))
                .map(|f| axis.extent(self.unplaced_box(*f).size()))
                .sum();
            let share = (inner_primary - fixed - gaps).max(0.0) / growers.len() as f64;
            for &g in &growers {
                let current = self.get(g).map_or(Size::ZERO, |c| c.size);
                self.write_size(g, axis.with_extent(current, share));
            }
        }
        for &f in &flow {
            if self.stretches(f) {
                let current = self.get(f).map_or(Size::ZERO, |c| c.size);
                self.write_size(f, cross.with_extent(current, inner_counter.max(0.0)));
            }
        }

        let boxes: Vec<Rect> = flow.iter().map(|f| self.unplaced_box(*f)).collect();
        let extents: f64 = boxes.iter().map(|b| axis.extent(b.size())).sum();
        let total = extents + gaps;
        let (mut cursor, gap) = if !growers.is_empty() {
            (p_start, props.spacing)
        } else {
            match props.primary_align {
                StackJustify::Min => (p_start, props.spacing),
                StackJustify::Center => (p_start + (inner_primary - total) * 0.5, props.spacing),
                StackJustify::Max => (p_start + inner_primary - total, props.spacing),
                StackJustify::SpaceEvenly if flow.len() > 1 => (
                    p_start,
                    (inner_primary - extents) / (flow.len() - 1) as f64,
                ),
                StackJustify::SpaceEvenly => (p_start, 0.0),
            }
        };
        let baseline = if props.counter_align == StackAlign::Baseline && axis == Axis::Horizontal {
            flow.iter()
                .filter(|f| !self.stretches(**f))
                .map(|f| self.baseline_of(*f))
                .fold(0.0, f64::max)
        } else {
            0.0
        };

        for (&f, b) in flow.iter().zip(&boxes) {
            let extent = cross.extent(b.size());
            let counter = if self.stretches(f) {
                c_start
            } else {
                match props.counter_align {
                    StackAlign::Min => c_start,
                    StackAlign::Center => c_start + (inner_counter - extent) * 0.5,
                    StackAlign::Max => c_start + inner_counter - extent,
                    StackAlign::Baseline if axis == Axis::Horizontal => {
                        c_start + baseline - self.baseline_of(f)
                    }
                    StackAlign::Baseline => c_start,
                }
            };
            let (x, y) = match axis {
                Axis::Horizontal => (cursor, counter),
                Axis::Vertical => (counter, cursor),
            };
            let Some(tf) = self.get(f).map(|c| c.transform) else {
                continue;
            };
            let [a, bb, c, d, _, _] = tf.as_coeffs();
            self.write_transform(f, Affine::new([a, bb, c, d, x - b.x0, y - b.y0]));
            tracing::trace!(child = ?f, x, y, "placed stack child");
            cursor += axis.extent(b.size()) + gap;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Padding, StackChildProps, StackMode, StackProps};
    use alloc::vec;

    fn translation(tree: &ElementTree, id: ElementId) -> (f64, f64) {
        let tf = tree.relative_transform(id).unwrap().as_coeffs();
        (tf[4], tf[5])
    }

    fn rect_at(
        tree: &mut ElementTree,
        parent: ElementId,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> ElementId {
        let e = tree.create();
        tree.set_size(e, Size::new(w, h));
        tree.set_relative_transform(e, Affine::translate((x, y)));
        tree.append_child(parent, e).unwrap();
        e
    }

    /// Horizontal hug frame 350x200 with two 100x100 children, padding and spacing 50.
    fn two_rect_frame() -> (ElementTree, ElementId, ElementId, ElementId) {
        let mut tree = ElementTree::new();
        let frame = tree.create_with_kind(crate::ElementKind::Frame);
        tree.set_size(frame, Size::new(350.0, 200.0));
        tree.append_child(tree.root(), frame).unwrap();
        let r1 = rect_at(&mut tree, frame, 50.0, 50.0, 100.0, 100.0);
        let r2 = rect_at(&mut tree, frame, 200.0, 50.0, 100.0, 100.0);
        tree.set_stack_props(
            frame,
            StackProps {
                mode: StackMode::Horizontal,
                primary_sizing: StackSize::Hug,
                counter_sizing: StackSize::Hug,
                padding: Padding::uniform(50.0),
                spacing: 50.0,
                ..Default::default()
            },
        );
        tree.refresh();
        (tree, frame, r1, r2)
    }

    fn set_props(tree: &mut ElementTree, id: ElementId, f: impl FnOnce(&mut StackProps)) {
        let mut props = *tree.stack_props(id).unwrap();
        f(&mut props);
        tree.set_stack_props(id, props);
        tree.refresh();
    }

    fn grow(tree: &mut ElementTree, id: ElementId) {
        tree.set_stack_child_props(
            id,
            StackChildProps {
                primary_grow: 1.0,
                ..Default::default()
            },
        );
        tree.refresh();
    }

    #[test]
    fn hug_sums_children_padding_and_spacing() {
        let (mut tree, frame, r1, r2) = two_rect_frame();
        assert_eq!(tree.size(frame), Some(Size::new(350.0, 200.0)));
        assert_eq!(translation(&tree, r2), (200.0, 50.0));

        tree.set_size(r1, Size::new(200.0, 100.0));
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(450.0, 200.0)));
        assert_eq!(translation(&tree, r2), (300.0, 50.0));

        tree.set_size(r1, Size::new(100.0, 100.0));
        set_props(&mut tree, frame, |p| p.spacing = 100.0);
        assert_eq!(tree.size(frame), Some(Size::new(400.0, 200.0)));
        assert_eq!(translation(&tree, r2), (250.0, 50.0));
    }

    #[test]
    fn fixed_width_is_padding_plus_children_plus_spacing() {
        let (mut tree, frame, _, r2) = two_rect_frame();
        set_props(&mut tree, frame, |p| {
            p.primary_sizing = StackSize::Fixed;
            p.spacing = 7.0;
        });
        tree.set_size(frame, Size::new(500.0, 200.0));
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(500.0, 200.0)));
        assert_eq!(translation(&tree, r2), (157.0, 50.0));
    }

    #[test]
    fn grow_children_share_leftover() {
        let (mut tree, frame, r1, r2) = two_rect_frame();
        set_props(&mut tree, frame, |p| p.primary_sizing = StackSize::Fixed);
        tree.set_size(frame, Size::new(400.0, 200.0));
        grow(&mut tree, r2);
        assert_eq!(tree.size(r2), Some(Size::new(150.0, 100.0)));

        tree.set_size(frame, Size::new(500.0, 200.0));
        grow(&mut tree, r1);
        assert_eq!(tree.size(r1), Some(Size::new(175.0, 100.0)));
        assert_eq!(tree.size(r2), Some(Size::new(175.0, 100.0)));
        assert_eq!(translation(&tree, r2), (275.0, 50.0));
    }

    #[test]
    fn hug_with_growing_children_keeps_size() {
        let (mut tree, frame, r1, r2) = two_rect_frame();
        set_props(&mut tree, frame, |p| p.spacing = 100.0);
        assert_eq!(tree.size(frame), Some(Size::new(400.0, 200.0)));
        grow(&mut tree, r1);
        grow(&mut tree, r2);
        tree.set_size(frame, Size::new(350.0, 200.0));
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(350.0, 200.0)));
        assert_eq!(tree.size(r1), Some(Size::new(75.0, 100.0)));
        assert_eq!(tree.size(r2), Some(Size::new(75.0, 100.0)));
    }

    #[test]
    fn single_grow_child_with_wide_spacing() {
        let (mut tree, frame, _, r2) = two_rect_frame();
        set_props(&mut tree, frame, |p| p.spacing = 100.0);
        grow(&mut tree, r2);
        tree.set_size(frame, Size::new(350.0, 200.0));
        tree.refresh();
        assert_eq!(tree.size(r2), Some(Size::new(50.0, 100.0)));
        assert_eq!(translation(&tree, r2), (250.0, 50.0));
    }

    #[test]
    fn space_evenly_pins_first_and_last() {
        let (mut tree, frame, r1, r2) = two_rect_frame();
        set_props(&mut tree, frame, |p| {
            p.primary_sizing = StackSize::Fixed;
            p.primary_align = StackJustify::SpaceEvenly;
        });
        tree.set_size(frame, Size::new(500.0, 200.0));
        tree.refresh();
        assert_eq!(translation(&tree, r1), (50.0, 50.0));
        assert_eq!(translation(&tree, r2), (350.0, 50.0));
    }

    #[test]
    fn counter_alignment_and_stretch() {
        let mut tree = ElementTree::new();
        let frame = tree.create_with_kind(crate::ElementKind::Frame);
        tree.set_size(frame, Size::new(125.0, 100.0));
        tree.append_child(tree.root(), frame).unwrap();
        let r1 = rect_at(&mut tree, frame, 25.0, 25.0, 25.0, 50.0);
        let r2 = rect_at(&mut tree, frame, 50.0, 50.0, 50.0, 25.0);
        tree.set_stack_props(
            frame,
            StackProps {
                mode: StackMode::Horizontal,
                primary_sizing: StackSize::Hug,
                counter_sizing: StackSize::Hug,
                counter_align: StackAlign::Max,
                padding: Padding::uniform(25.0),
                ..Default::default()
            },
        );
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(125.0, 100.0)));
        assert_eq!(translation(&tree, r2), (50.0, 50.0));

        tree.set_stack_child_props(
            r1,
            StackChildProps {
                align_self: StackAlignSelf::Stretch,
                ..Default::default()
            },
        );
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(125.0, 75.0)));
        assert_eq!(tree.size(r1), Some(Size::new(25.0, 25.0)));
        assert_eq!(translation(&tree, r1), (25.0, 25.0));

        set_props(&mut tree, frame, |p| p.counter_align = StackAlign::Center);
        assert_eq!(translation(&tree, r2), (50.0, 25.0));
    }

    #[test]
    fn absolute_and_hidden_children_leave_the_flow() {
        let mut tree = ElementTree::new();
        let frame = tree.create_with_kind(crate::ElementKind::Frame);
        tree.append_child(tree.root(), frame).unwrap();
        let a = rect_at(&mut tree, frame, 0.0, 0.0, 20.0, 20.0);
        let abs = rect_at(&mut tree, frame, 500.0, 500.0, 80.0, 80.0);
        let hidden = rect_at(&mut tree, frame, 0.0, 0.0, 80.0, 80.0);
        let b = rect_at(&mut tree, frame, 0.0, 0.0, 20.0, 20.0);
        tree.set_visible(hidden, false);
        tree.set_stack_child_props(
            abs,
            StackChildProps {
                positioning: StackPositioning::Absolute,
                ..Default::default()
            },
        );
        tree.set_stack_props(
            frame,
            StackProps {
                mode: StackMode::Horizontal,
                primary_sizing: StackSize::Hug,
                counter_sizing: StackSize::Hug,
                padding: Padding::uniform(20.0),
                ..Default::default()
            },
        );
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(80.0, 60.0)));
        assert_eq!(translation(&tree, abs), (500.0, 500.0), "absolute keeps its transform");
        assert_eq!(translation(&tree, b), (40.0, 20.0));
        assert_eq!(tree.paint_order(frame), vec![a, hidden, b, abs]);
        assert_eq!(tree.children_of(frame), &[a, abs, hidden, b], "stored order untouched");
    }

    #[test]
    fn reverse_z_reverses_flow() {
        let (mut tree, frame, r1, r2) = two_rect_frame();
        set_props(&mut tree, frame, |p| p.reverse_z_index = true);
        assert_eq!(translation(&tree, r2), (50.0, 50.0));
        assert_eq!(translation(&tree, r1), (200.0, 50.0));
        assert_eq!(tree.children_of(frame), &[r1, r2], "paint order is unchanged");
    }

    #[test]
    fn nested_hug_propagates_upward() {
        let mut tree = ElementTree::new();
        let outer = tree.create_with_kind(crate::ElementKind::Frame);
        let inner = tree.create_with_kind(crate::ElementKind::Frame);
        tree.append_child(tree.root(), outer).unwrap();
        tree.append_child(outer, inner).unwrap();
        let leaf = rect_at(&mut tree, inner, 0.0, 0.0, 30.0, 10.0);
        let hug = StackProps {
            mode: StackMode::Vertical,
            primary_sizing: StackSize::Hug,
            counter_sizing: StackSize::Hug,
            padding: Padding::uniform(5.0),
            ..Default::default()
        };
        tree.set_stack_props(outer, hug);
        tree.set_stack_props(inner, hug);
        tree.refresh();
        assert_eq!(tree.size(inner), Some(Size::new(40.0, 20.0)));
        assert_eq!(tree.size(outer), Some(Size::new(50.0, 30.0)));

        tree.set_size(leaf, Size::new(60.0, 10.0));
        tree.refresh();
        assert_eq!(tree.size(outer), Some(Size::new(80.0, 30.0)));
    }

    #[test]
    fn baseline_alignment_lines_up_baselines() {
        let mut tree = ElementTree::new();
        let frame = tree.create_with_kind(crate::ElementKind::Frame);
        tree.append_child(tree.root(), frame).unwrap();
        let t1 = rect_at(&mut tree, frame, 0.0, 0.0, 40.0, 20.0);
        let t2 = rect_at(&mut tree, frame, 0.0, 0.0, 40.0, 24.0);
        tree.set_baseline(t1, Some(15.0));
        tree.set_baseline(t2, Some(16.0));
        tree.set_stack_props(
            frame,
            StackProps {
                mode: StackMode::Horizontal,
                primary_sizing: StackSize::Hug,
                counter_sizing: StackSize::Hug,
                counter_align: StackAlign::Baseline,
                ..Default::default()
            },
        );
        tree.refresh();
        assert_eq!(translation(&tree, t1), (0.0, 1.0));
        assert_eq!(translation(&tree, t2), (40.0, 0.0));
        assert_eq!(tree.size(frame), Some(Size::new(80.0, 24.0)));
    }
}
