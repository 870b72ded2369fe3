// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched layout commands with conflict resolution and undo snapshots.
//!
//! Every command validates the whole selection before touching the tree, applies its fields
//! to each element in selection order, forces whatever other properties are needed to keep
//! the layout solvable, and reports one [`LayoutConflict`](super::LayoutConflict) per kind of
//! forced change.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Affine, Size};

use super::conflict::{ConflictKind, ConflictLog, ConflictReporter};
use super::{
    Axis, AxisSizing, Padding, StackAlign, StackAlignSelf, StackChildProps, StackJustify,
    StackMode, StackPositioning, StackProps, StackSize, TextAutoResize,
};
use crate::error::{LayoutError, TreeError};
use crate::tree::ElementTree;
use crate::types::{ElementId, ElementKind};
use crate::util::{affine_nearly_equal, size_nearly_equal};

/// Partial update of container properties. `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateAutoLayout {
    /// New direction. Switching between horizontal and vertical keeps physical sizing.
    pub stack_mode: Option<StackMode>,
    /// Sizing along the (new) primary axis.
    pub primary_sizing: Option<StackSize>,
    /// Sizing along the (new) counter axis.
    pub counter_sizing: Option<StackSize>,
    /// Distribution along the primary axis.
    pub primary_align: Option<StackJustify>,
    /// Alignment along the counter axis.
    pub counter_align: Option<StackAlign>,
    /// Inner padding.
    pub padding: Option<Padding>,
    /// Gap between flow children.
    pub spacing: Option<f64>,
    /// Flow opposite to paint order.
    pub reverse_z_index: Option<bool>,
}

/// Partial update of stack-child properties. `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateAutoLayoutChild {
    /// Grow factor; anything above zero is stored as `1`.
    pub primary_grow: Option<f64>,
    /// Counter-axis behavior.
    pub align_self: Option<StackAlignSelf>,
    /// In or out of flow.
    pub positioning: Option<StackPositioning>,
}

/// Set the width or height sizing of each selected element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateWhValue {
    /// Physical axis.
    pub axis: Axis,
    /// Requested sizing.
    pub value: AxisSizing,
}

/// Resize each selected element. Content-driven axes become fixed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Resize {
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
}

#[derive(Clone, Debug)]
struct LayoutSnapshot {
    id: ElementId,
    kind: ElementKind,
    stack: StackProps,
    stack_child: StackChildProps,
    size: Size,
    transform: Affine,
    text_auto_resize: TextAutoResize,
}

/// Structural edits made by add-auto-layout.
#[derive(Clone, Debug, Default)]
pub(crate) struct Restructure {
    /// Frame created to wrap the selection.
    pub(crate) wrapper: Option<ElementId>,
    /// `(element, old parent, old index)` for every wrapped element.
    pub(crate) moved: Vec<(ElementId, ElementId, usize)>,
    /// Container whose children were reordered, with the previous order.
    pub(crate) reordered: Option<(ElementId, Vec<ElementId>)>,
}

/// Everything a layout command may change, captured before it ran.
#[derive(Clone, Debug, Default)]
pub struct LayoutUndo {
    snapshots: Vec<LayoutSnapshot>,
    restructure: Option<Restructure>,
}

impl LayoutUndo {
    /// Snapshot every element a layout pass starting at `ids` can write.
    pub(crate) fn capture(tree: &mut ElementTree, ids: &[ElementId]) -> Self {
        tree.refresh();
        let mut seen: HashSet<ElementId> = HashSet::new();
        let mut snapshots = Vec::new();
        for &id in ids {
            if !tree.is_alive(id) {
                continue;
            }
            let root = tree.layout_root(id);
            for e in tree.preorder(root) {
                if !seen.insert(e) {
                    continue;
                }
                let Some(n) = tree.get(e) else {
                    continue;
                };
                snapshots.push(LayoutSnapshot {
                    id: e,
                    kind: n.kind,
                    stack: n.stack,
                    stack_child: n.stack_child,
                    size: n.size,
                    transform: n.transform,
                    text_auto_resize: n.text_auto_resize,
                });
            }
        }
        Self {
            snapshots,
            restructure: None,
        }
    }

    pub(crate) fn with_restructure(mut self, restructure: Restructure) -> Self {
        self.restructure = Some(restructure);
        self
    }

    /// Number of elements captured.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty() && self.restructure.is_none()
    }

    /// Restore the captured state, undoing structural edits first.
    pub fn revert(&self, tree: &mut ElementTree) -> Result<(), TreeError> {
        if let Some(r) = &self.restructure {
            if let Some(wrapper) = r.wrapper {
                tree.remove_from_parent(wrapper)?;
                let mut moved = r.moved.clone();
                moved.sort_by_key(|(_, _, index)| *index);
                for &(id, parent, index) in &moved {
                    tree.insert_child(parent, id, index)?;
                }
                tree.destroy(wrapper)?;
            }
            if let Some((container, order)) = &r.reordered {
                for (i, &c) in order.iter().enumerate() {
                    tree.insert_child(*container, c, i)?;
                }
            }
        }
        for s in &self.snapshots {
            tree.modify(s.id, true, |n| {
                let changed = n.kind != s.kind
                    || n.stack != s.stack
                    || n.stack_child != s.stack_child
                    || !size_nearly_equal(n.size, s.size)
                    || !affine_nearly_equal(n.transform, s.transform)
                    || n.text_auto_resize != s.text_auto_resize;
                n.kind = s.kind;
                n.stack = s.stack;
                n.stack_child = s.stack_child;
                n.size = s.size;
                n.transform = s.transform;
                n.text_auto_resize = s.text_auto_resize;
                changed
            });
        }
        tracing::debug!(elements = self.snapshots.len(), "reverted layout command");
        Ok(())
    }
}

fn conflict_kind(axis: Axis) -> ConflictKind {
    match axis {
        Axis::Horizontal => ConflictKind::FixedWidth,
        Axis::Vertical => ConflictKind::FixedHeight,
    }
}

fn name_of(tree: &ElementTree, id: ElementId) -> String {
    String::from(tree.name(id).unwrap_or_default())
}

pub(crate) fn edit_stack(tree: &mut ElementTree, id: ElementId, f: impl FnOnce(&mut StackProps)) {
    if let Some(mut props) = tree.stack_props(id).copied() {
        f(&mut props);
        tree.set_stack_props(id, props);
    }
}

pub(crate) fn edit_child(
    tree: &mut ElementTree,
    id: ElementId,
    f: impl FnOnce(&mut StackChildProps),
) {
    if let Some(mut props) = tree.stack_child_props(id).copied() {
        f(&mut props);
        tree.set_stack_child_props(id, props);
    }
}

/// Drop grow and stretch, keeping positioning.
pub(crate) fn clear_fills(tree: &mut ElementTree, id: ElementId) {
    edit_child(tree, id, |p| {
        p.primary_grow = 0.0;
        p.align_self = StackAlignSelf::Auto;
    });
}

pub(crate) fn validate_selection(tree: &ElementTree, ids: &[ElementId]) -> Result<(), LayoutError> {
    if ids.is_empty() {
        return Err(LayoutError::EmptySelection);
    }
    for &id in ids {
        if !tree.is_alive(id) {
            return Err(TreeError::StaleId(id).into());
        }
    }
    Ok(())
}

/// A container axis became content-driven.
fn resolve_container_hug(
    tree: &mut ElementTree,
    id: ElementId,
    axis: Axis,
    log: &mut ConflictLog,
    report_own_fill: bool,
) {
    let Some(primary) = tree.stack_props(id).and_then(|p| p.mode.primary_axis()) else {
        return;
    };
    let flow = tree.flow_children(id);
    if axis == primary {
        for &c in &flow {
            if tree.grows(c) {
                edit_child(tree, c, |p| p.primary_grow = 0.0);
                log.record(conflict_kind(axis), &name_of(tree, c));
            }
        }
        if tree
            .stack_props(id)
            .is_some_and(|p| p.primary_align == StackJustify::SpaceEvenly)
        {
            edit_stack(tree, id, |p| p.primary_align = StackJustify::Min);
            log.record(ConflictKind::FixedSpacing, &name_of(tree, id));
        }
    } else if !flow.is_empty() && flow.iter().all(|c| tree.stretches(*c)) {
        for &c in &flow {
            edit_child(tree, c, |p| p.align_self = StackAlignSelf::Auto);
            log.record(conflict_kind(axis), &name_of(tree, c));
        }
    }
    if let Some((_, parent_axis)) = tree.stack_parent(id)
        && tree
            .stack_child_props(id)
            .is_some_and(|p| p.fills(parent_axis, axis))
    {
        edit_child(tree, id, |p| p.set_fill(parent_axis, axis, false));
        if report_own_fill {
            log.record(conflict_kind(axis), &name_of(tree, id));
        }
    }
}

/// A stack child started filling `axis` of its parent.
fn resolve_child_fill(tree: &mut ElementTree, id: ElementId, axis: Axis, log: &mut ConflictLog) {
    let Some((parent, parent_axis)) = tree.stack_parent(id) else {
        return;
    };
    if tree
        .stack_props(id)
        .is_some_and(|p| p.sizing_on(axis) == Some(StackSize::Hug))
    {
        edit_stack(tree, id, |p| p.set_sizing_on(axis, StackSize::Fixed));
        log.record(conflict_kind(axis), &name_of(tree, id));
    }
    if let Some(mode) = tree.text_auto_resize(id)
        && mode.hugs(axis)
    {
        tree.set_text_auto_resize(id, mode.with_axis(axis, false));
    }
    let Some(parent_props) = tree.stack_props(parent).copied() else {
        return;
    };
    if axis == parent_axis {
        if parent_props.primary_sizing == StackSize::Hug {
            edit_stack(tree, parent, |p| p.primary_sizing = StackSize::Fixed);
            log.record(conflict_kind(axis), &name_of(tree, parent));
        }
        if parent_props.primary_align == StackJustify::SpaceEvenly {
            edit_stack(tree, parent, |p| p.primary_align = StackJustify::Min);
            log.record(ConflictKind::FixedSpacing, &name_of(tree, parent));
        }
    } else if parent_props.counter_sizing == StackSize::Hug {
        let flow = tree.flow_children(parent);
        if !flow.is_empty() && flow.iter().all(|c| tree.stretches(*c)) {
            edit_stack(tree, parent, |p| p.counter_sizing = StackSize::Fixed);
            log.record(conflict_kind(axis), &name_of(tree, parent));
        }
    }
}

/// Swap each child's grow and stretch so physical fill behavior survives a direction switch.
fn swap_child_fills(tree: &mut ElementTree, id: ElementId) {
    for c in tree.children_of(id).to_vec() {
        edit_child(tree, c, |p| {
            let grew = p.primary_grow > 0.0;
            let stretched = p.align_self == StackAlignSelf::Stretch;
            p.primary_grow = if stretched { 1.0 } else { 0.0 };
            p.align_self = if grew {
                StackAlignSelf::Stretch
            } else {
                StackAlignSelf::Auto
            };
        });
    }
}

/// Apply container property updates to every element in `ids`.
pub fn apply_update_auto_layout(
    tree: &mut ElementTree,
    ids: &[ElementId],
    cmd: &UpdateAutoLayout,
    reporter: &mut dyn ConflictReporter,
) -> Result<LayoutUndo, LayoutError> {
    validate_selection(tree, ids)?;
    let undo = LayoutUndo::capture(tree, ids);
    let mut log = ConflictLog::default();
    let wants_space_evenly = cmd.primary_align == Some(StackJustify::SpaceEvenly);

    for &id in ids {
        let Some(old) = tree.stack_props(id).copied() else {
            continue;
        };
        let mut props = old;
        let mut switched = false;
        if let Some(mode) = cmd.stack_mode
            && mode != old.mode
        {
            if old.mode.is_stack() && mode.is_stack() {
                core::mem::swap(&mut props.primary_sizing, &mut props.counter_sizing);
                switched = true;
            }
            props.mode = mode;
        }
        if let Some(v) = cmd.primary_sizing {
            props.primary_sizing = v;
        }
        if let Some(v) = cmd.counter_sizing {
            props.counter_sizing = v;
        }
        if let Some(v) = cmd.primary_align {
            props.primary_align = v;
        }
        if let Some(v) = cmd.counter_align {
            props.counter_align = v;
        }
        if let Some(v) = cmd.padding {
            props.padding = v;
        }
        if let Some(v) = cmd.spacing {
            props.spacing = v;
        }
        if let Some(v) = cmd.reverse_z_index {
            props.reverse_z_index = v;
        }
        if props.mode == StackMode::Vertical && props.counter_align == StackAlign::Baseline {
            props.counter_align = StackAlign::Min;
        }
        let Some(primary) = props.mode.primary_axis() else {
            tree.set_stack_props(id, props);
            if old.mode.is_stack() {
                for c in tree.children_of(id).to_vec() {
                    clear_fills(tree, c);
                }
            }
            continue;
        };

        if wants_space_evenly && props.primary_sizing == StackSize::Hug {
            props.primary_sizing = StackSize::Fixed;
            log.record(conflict_kind(primary), &name_of(tree, id));
        }
        tree.set_stack_props(id, props);
        if switched {
            swap_child_fills(tree, id);
        }

        let entered = !old.mode.is_stack();
        for (axis, requested) in [
            (primary, cmd.primary_sizing),
            (primary.cross(), cmd.counter_sizing),
        ] {
            let hugs = props.sizing_on(axis) == Some(StackSize::Hug);
            if hugs && (entered || requested == Some(StackSize::Hug)) {
                resolve_container_hug(tree, id, axis, &mut log, true);
            }
        }

        if wants_space_evenly {
            for c in tree.flow_children(id) {
                if tree.grows(c) {
                    edit_child(tree, c, |p| p.primary_grow = 0.0);
                    log.record(conflict_kind(primary), &name_of(tree, c));
                }
            }
        }
    }
    log.report(reporter);
    Ok(undo)
}

/// Apply stack-child property updates to every element in `ids`.
///
/// Every element must be a child of a stack container.
pub fn apply_update_auto_layout_child(
    tree: &mut ElementTree,
    ids: &[ElementId],
    cmd: &UpdateAutoLayoutChild,
    reporter: &mut dyn ConflictReporter,
) -> Result<LayoutUndo, LayoutError> {
    validate_selection(tree, ids)?;
    if let Some(&id) = ids.iter().find(|id| tree.stack_parent(**id).is_none()) {
        return Err(LayoutError::NotStackChild(id));
    }
    let undo = LayoutUndo::capture(tree, ids);
    let mut log = ConflictLog::default();

    for &id in ids {
        edit_child(tree, id, |p| {
            if let Some(g) = cmd.primary_grow {
                p.primary_grow = if g > 0.0 { 1.0 } else { 0.0 };
            }
            if let Some(a) = cmd.align_self {
                p.align_self = a;
            }
            if let Some(pos) = cmd.positioning {
                p.positioning = pos;
            }
        });
    }
    for &id in ids {
        let Some((_, parent_axis)) = tree.stack_parent(id) else {
            continue;
        };
        let Some(props) = tree.stack_child_props(id).copied() else {
            continue;
        };
        if cmd.primary_grow.is_some() && props.fills(parent_axis, parent_axis) {
            resolve_child_fill(tree, id, parent_axis, &mut log);
        }
        let cross = parent_axis.cross();
        if cmd.align_self.is_some() && props.fills(parent_axis, cross) {
            resolve_child_fill(tree, id, cross, &mut log);
        }
    }
    log.report(reporter);
    Ok(undo)
}

/// Set width or height sizing on every element in `ids`.
///
/// `Fill` requires a stack parent; `Hug` requires a stack container or a text element.
pub fn apply_update_wh_value(
    tree: &mut ElementTree,
    ids: &[ElementId],
    cmd: &UpdateWhValue,
    reporter: &mut dyn ConflictReporter,
) -> Result<LayoutUndo, LayoutError> {
    validate_selection(tree, ids)?;
    for &id in ids {
        match cmd.value {
            AxisSizing::Fill if tree.stack_parent(id).is_none() => {
                return Err(LayoutError::NotStackChild(id));
            }
            AxisSizing::Hug
                if !tree.is_stack_container(id) && tree.kind(id) != Some(ElementKind::Text) =>
            {
                return Err(LayoutError::NotStackContainer(id));
            }
            _ => {}
        }
    }
    let undo = LayoutUndo::capture(tree, ids);
    let mut log = ConflictLog::default();
    let axis = cmd.axis;

    for &id in ids {
        match cmd.value {
            AxisSizing::Fill => {
                if let Some((_, parent_axis)) = tree.stack_parent(id) {
                    edit_child(tree, id, |p| p.set_fill(parent_axis, axis, true));
                    resolve_child_fill(tree, id, axis, &mut log);
                }
            }
            AxisSizing::Hug => {
                if tree.is_stack_container(id) {
                    edit_stack(tree, id, |p| p.set_sizing_on(axis, StackSize::Hug));
                    resolve_container_hug(tree, id, axis, &mut log, false);
                } else {
                    if let Some(mode) = tree.text_auto_resize(id) {
                        tree.set_text_auto_resize(id, mode.with_axis(axis, true));
                    }
                    clear_own_fill(tree, id, axis);
                }
            }
            AxisSizing::Fixed => {
                edit_stack(tree, id, |p| p.set_sizing_on(axis, StackSize::Fixed));
                if let Some(mode) = tree.text_auto_resize(id) {
                    tree.set_text_auto_resize(id, mode.with_axis(axis, false));
                }
                clear_own_fill(tree, id, axis);
            }
        }
    }
    log.report(reporter);
    Ok(undo)
}

fn clear_own_fill(tree: &mut ElementTree, id: ElementId, axis: Axis) {
    if let Some((_, parent_axis)) = tree.stack_parent(id) {
        edit_child(tree, id, |p| p.set_fill(parent_axis, axis, false));
    }
}

/// Resize every element in `ids`. Resized hug, fill, or auto-resizing text axes become fixed.
pub fn apply_resize(
    tree: &mut ElementTree,
    ids: &[ElementId],
    cmd: &Resize,
) -> Result<LayoutUndo, LayoutError> {
    validate_selection(tree, ids)?;
    let undo = LayoutUndo::capture(tree, ids);
    for &id in ids {
        let Some(current) = tree.size(id) else {
            continue;
        };
        for (axis, value) in [(Axis::Horizontal, cmd.width), (Axis::Vertical, cmd.height)] {
            if value.is_none() {
                continue;
            }
            edit_stack(tree, id, |p| p.set_sizing_on(axis, StackSize::Fixed));
            if let Some(mode) = tree.text_auto_resize(id) {
                tree.set_text_auto_resize(id, mode.with_axis(axis, false));
            }
            clear_own_fill(tree, id, axis);
        }
        let size = Size::new(
            cmd.width.unwrap_or(current.width).max(0.0),
            cmd.height.unwrap_or(current.height).max(0.0),
        );
        tree.set_size(id, size);
    }
    Ok(undo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConflict;
    use alloc::vec;

    /// A hug horizontal frame named "Frame" with two 100x100 children "A" and "B".
    fn setup() -> (ElementTree, ElementId, ElementId, ElementId) {
        let mut tree = ElementTree::new();
        let frame = tree.create_with_kind(ElementKind::Frame);
        tree.set_name(frame, "Frame");
        tree.append_child(tree.root(), frame).unwrap();
        let mut kids = Vec::new();
        for name in ["A", "B"] {
            let c = tree.create();
            tree.set_name(c, name);
            tree.set_size(c, Size::new(100.0, 100.0));
            tree.append_child(frame, c).unwrap();
            kids.push(c);
        }
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
        (tree, frame, kids[0], kids[1])
    }

    #[test]
    fn child_fill_in_hug_container_fixes_the_container() {
        let (mut tree, frame, a, b) = setup();
        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateWhValue {
            axis: Axis::Horizontal,
            value: AxisSizing::Fill,
        };
        apply_update_wh_value(&mut tree, &[a, b], &cmd, &mut conflicts).unwrap();
        tree.refresh();

        assert_eq!(tree.stack_props(frame).unwrap().primary_sizing, StackSize::Fixed);
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 1.0);
        assert_eq!(
            conflicts,
            vec![LayoutConflict {
                kind: ConflictKind::FixedWidth,
                names: vec![String::from("Frame")],
            }],
            "the container is named once"
        );
        assert_eq!(tree.size(a), Some(Size::new(100.0, 100.0)));
    }

    #[test]
    fn container_hug_resets_growing_children() {
        let (mut tree, frame, a, b) = setup();
        edit_stack(&mut tree, frame, |p| p.primary_sizing = StackSize::Fixed);
        for c in [a, b] {
            edit_child(&mut tree, c, |p| p.primary_grow = 1.0);
        }
        tree.set_size(frame, Size::new(500.0, 200.0));
        tree.refresh();
        assert_eq!(tree.size(a), Some(Size::new(175.0, 100.0)));

        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateAutoLayout {
            primary_sizing: Some(StackSize::Hug),
            ..Default::default()
        };
        apply_update_auto_layout(&mut tree, &[frame], &cmd, &mut conflicts).unwrap();
        tree.refresh();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::FixedWidth);
        assert_eq!(conflicts[0].names, ["A", "B"]);
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 0.0);
        assert_eq!(tree.size(frame), Some(Size::new(500.0, 200.0)), "175 + 175 + 150");
    }

    #[test]
    fn space_evenly_and_hug_resolve_both_ways() {
        let (mut tree, frame, _, _) = setup();
        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let se = UpdateAutoLayout {
            primary_align: Some(StackJustify::SpaceEvenly),
            ..Default::default()
        };
        apply_update_auto_layout(&mut tree, &[frame], &se, &mut conflicts).unwrap();
        let props = *tree.stack_props(frame).unwrap();
        assert_eq!(props.primary_align, StackJustify::SpaceEvenly);
        assert_eq!(props.primary_sizing, StackSize::Fixed);
        assert_eq!(conflicts[0].kind, ConflictKind::FixedWidth);

        conflicts.clear();
        let hug = UpdateAutoLayout {
            primary_sizing: Some(StackSize::Hug),
            ..Default::default()
        };
        apply_update_auto_layout(&mut tree, &[frame], &hug, &mut conflicts).unwrap();
        let props = *tree.stack_props(frame).unwrap();
        assert_eq!(props.primary_sizing, StackSize::Hug);
        assert_eq!(props.primary_align, StackJustify::Min);
        assert_eq!(conflicts[0].kind, ConflictKind::FixedSpacing);
    }

    #[test]
    fn grow_in_space_evenly_container_packs_it() {
        let (mut tree, frame, a, _) = setup();
        edit_stack(&mut tree, frame, |p| {
            p.primary_sizing = StackSize::Fixed;
            p.primary_align = StackJustify::SpaceEvenly;
        });
        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateAutoLayoutChild {
            primary_grow: Some(1.0),
            ..Default::default()
        };
        apply_update_auto_layout_child(&mut tree, &[a], &cmd, &mut conflicts).unwrap();
        assert_eq!(tree.stack_props(frame).unwrap().primary_align, StackJustify::Min);
        assert_eq!(conflicts[0].kind, ConflictKind::FixedSpacing);
        assert_eq!(conflicts[0].names, ["Frame"]);
    }

    #[test]
    fn counter_stretch_fixes_hug_once_all_children_stretch() {
        let (mut tree, frame, a, b) = setup();
        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateAutoLayoutChild {
            align_self: Some(StackAlignSelf::Stretch),
            ..Default::default()
        };
        apply_update_auto_layout_child(&mut tree, &[a], &cmd, &mut conflicts).unwrap();
        assert!(conflicts.is_empty(), "one child still sizes the counter axis");
        assert_eq!(tree.stack_props(frame).unwrap().counter_sizing, StackSize::Hug);

        apply_update_auto_layout_child(&mut tree, &[b], &cmd, &mut conflicts).unwrap();
        assert_eq!(tree.stack_props(frame).unwrap().counter_sizing, StackSize::Fixed);
        assert_eq!(conflicts[0].kind, ConflictKind::FixedHeight);
    }

    #[test]
    fn direction_switch_keeps_physical_sizing() {
        let (mut tree, frame, a, _) = setup();
        edit_stack(&mut tree, frame, |p| {
            p.counter_sizing = StackSize::Fixed;
            p.counter_align = StackAlign::Baseline;
        });
        edit_child(&mut tree, a, |p| p.align_self = StackAlignSelf::Stretch);
        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateAutoLayout {
            stack_mode: Some(StackMode::Vertical),
            ..Default::default()
        };
        apply_update_auto_layout(&mut tree, &[frame], &cmd, &mut conflicts).unwrap();
        let props = *tree.stack_props(frame).unwrap();
        assert_eq!(props.sizing_on(Axis::Horizontal), Some(StackSize::Hug));
        assert_eq!(props.sizing_on(Axis::Vertical), Some(StackSize::Fixed));
        assert_eq!(props.counter_align, StackAlign::Min);
        let child = tree.stack_child_props(a).unwrap();
        assert_eq!(child.primary_grow, 1.0, "height stretch became vertical grow");
        assert_eq!(child.align_self, StackAlignSelf::Auto);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn nested_hug_child_set_to_fill_becomes_fixed() {
        let (mut tree, frame, a, _) = setup();
        let inner = tree.create_with_kind(ElementKind::Frame);
        tree.set_name(inner, "Inner");
        tree.append_child(frame, inner).unwrap();
        let leaf = tree.create();
        tree.set_size(leaf, Size::new(10.0, 10.0));
        tree.append_child(inner, leaf).unwrap();
        tree.set_stack_props(
            inner,
            StackProps {
                mode: StackMode::Vertical,
                primary_sizing: StackSize::Hug,
                counter_sizing: StackSize::Hug,
                ..Default::default()
            },
        );
        edit_stack(&mut tree, frame, |p| p.primary_sizing = StackSize::Fixed);
        let mut conflicts: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateWhValue {
            axis: Axis::Horizontal,
            value: AxisSizing::Fill,
        };
        apply_update_wh_value(&mut tree, &[inner], &cmd, &mut conflicts).unwrap();
        assert_eq!(
            tree.stack_props(inner).unwrap().sizing_on(Axis::Horizontal),
            Some(StackSize::Fixed)
        );
        assert_eq!(conflicts[0].names, ["Inner"]);
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 0.0);
    }

    #[test]
    fn text_sizing_sets_auto_resize() {
        let (mut tree, _, _, _) = setup();
        let text = tree.create_with_kind(ElementKind::Text);
        tree.append_child(tree.root(), text).unwrap();
        let mut sink: Vec<LayoutConflict> = Vec::new();
        let hug_width = UpdateWhValue {
            axis: Axis::Horizontal,
            value: AxisSizing::Hug,
        };
        apply_update_wh_value(&mut tree, &[text], &hug_width, &mut sink).unwrap();
        assert_eq!(tree.text_auto_resize(text), Some(TextAutoResize::WidthAndHeight));
        let fixed_width = UpdateWhValue {
            axis: Axis::Horizontal,
            value: AxisSizing::Fixed,
        };
        apply_update_wh_value(&mut tree, &[text], &fixed_width, &mut sink).unwrap();
        assert_eq!(tree.text_auto_resize(text), Some(TextAutoResize::Height));
        assert!(sink.is_empty());
    }

    #[test]
    fn selection_is_validated_before_mutating() {
        let (mut tree, frame, a, _) = setup();
        let loose = tree.create();
        let mut sink: Vec<LayoutConflict> = Vec::new();
        let fill = UpdateWhValue {
            axis: Axis::Horizontal,
            value: AxisSizing::Fill,
        };
        assert_eq!(
            apply_update_wh_value(&mut tree, &[a, loose], &fill, &mut sink).unwrap_err(),
            LayoutError::NotStackChild(loose)
        );
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 0.0);
        assert_eq!(
            apply_update_wh_value(&mut tree, &[], &fill, &mut sink).unwrap_err(),
            LayoutError::EmptySelection
        );
        let hug = UpdateWhValue {
            axis: Axis::Vertical,
            value: AxisSizing::Hug,
        };
        assert_eq!(
            apply_update_wh_value(&mut tree, &[a], &hug, &mut sink).unwrap_err(),
            LayoutError::NotStackContainer(a)
        );
        assert!(tree.is_stack_container(frame));
    }

    #[test]
    fn resize_fixes_hug_and_revert_restores() {
        let (mut tree, frame, a, b) = setup();
        let undo = apply_resize(
            &mut tree,
            &[frame],
            &Resize {
                width: Some(600.0),
                height: None,
            },
        )
        .unwrap();
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(600.0, 200.0)));
        assert_eq!(tree.stack_props(frame).unwrap().primary_sizing, StackSize::Fixed);
        assert_eq!(tree.stack_props(frame).unwrap().counter_sizing, StackSize::Hug);
        assert!(undo.len() >= 3, "frame and both children are captured");

        undo.revert(&mut tree).unwrap();
        tree.refresh();
        assert_eq!(tree.size(frame), Some(Size::new(350.0, 200.0)));
        assert_eq!(tree.stack_props(frame).unwrap().primary_sizing, StackSize::Hug);
        let tf = tree.relative_transform(b).unwrap().as_coeffs();
        assert_eq!((tf[4], tf[5]), (200.0, 50.0));
        assert_eq!(tree.size(a), Some(Size::new(100.0, 100.0)));
    }

    #[test]
    fn removing_auto_layout_clears_child_fills() {
        let (mut tree, frame, a, b) = setup();
        tree.set_stack_child_props(
            a,
            StackChildProps {
                primary_grow: 1.0,
                ..Default::default()
            },
        );
        tree.set_stack_child_props(
            b,
            StackChildProps {
                align_self: StackAlignSelf::Stretch,
                positioning: StackPositioning::Absolute,
                ..Default::default()
            },
        );
        let mut sink: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateAutoLayout {
            stack_mode: Some(StackMode::None),
            ..Default::default()
        };
        let undo = apply_update_auto_layout(&mut tree, &[frame], &cmd, &mut sink).unwrap();
        assert!(!tree.is_stack_container(frame));
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 0.0);
        let b_props = *tree.stack_child_props(b).unwrap();
        assert_eq!(b_props.align_self, StackAlignSelf::Auto);
        assert_eq!(b_props.positioning, StackPositioning::Absolute, "positioning is kept");
        assert!(sink.is_empty());

        undo.revert(&mut tree).unwrap();
        assert!(tree.is_stack_container(frame));
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 1.0);
        assert_eq!(tree.stack_child_props(b).unwrap().align_self, StackAlignSelf::Stretch);
    }

    #[test]
    fn revert_restores_forced_overrides() {
        let (mut tree, frame, a, b) = setup();
        let mut sink: Vec<LayoutConflict> = Vec::new();
        let cmd = UpdateWhValue {
            axis: Axis::Horizontal,
            value: AxisSizing::Fill,
        };
        let undo = apply_update_wh_value(&mut tree, &[a, b], &cmd, &mut sink).unwrap();
        undo.revert(&mut tree).unwrap();
        assert_eq!(tree.stack_props(frame).unwrap().primary_sizing, StackSize::Hug);
        assert_eq!(tree.stack_child_props(a).unwrap().primary_grow, 0.0);
        assert_eq!(tree.stack_child_props(b).unwrap().primary_grow, 0.0);
    }
}
