// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inferring auto-layout properties from the current arrangement of a selection.

use alloc::vec::Vec;

use kurbo::{Affine, Rect, Size, Vec2};

use super::command::{LayoutUndo, Restructure, clear_fills, validate_selection};
use super::{
    Axis, LayoutConfig, Padding, StackAlign, StackJustify, StackMode, StackProps, StackSize,
};
use crate::error::LayoutError;
use crate::tree::ElementTree;
use crate::types::{ElementId, ElementKind};
use crate::util::{nearly_equal, rects_overlap, transform_rect_bbox, union_rects};

/// Result of [`add_auto_layout`].
#[derive(Clone, Debug)]
pub struct AddAutoLayout {
    /// The element that received the stack properties.
    pub container: ElementId,
    /// Reverts the whole operation, including any wrapper frame.
    pub undo: LayoutUndo,
}

/// Direction, order and gaps read off a set of boxes.
#[derive(Clone, Debug, PartialEq)]
struct InferredFlow {
    axis: Axis,
    /// Indices into the input in flow order.
    order: Vec<usize>,
    spacing: f64,
    counter_align: StackAlign,
}

fn infer_flow(boxes: &[Rect]) -> InferredFlow {
    let spread = |axis: Axis| {
        let centers = boxes.iter().map(|b| axis.center(*b));
        let lo = centers.clone().fold(f64::INFINITY, f64::min);
        let hi = centers.fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    let axis = if spread(Axis::Horizontal) > spread(Axis::Vertical) {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|a, b| axis.min(boxes[*a]).total_cmp(&axis.min(boxes[*b])));

    let spacing = if order.len() > 1 {
        let gaps: f64 = order
            .windows(2)
            .map(|w| axis.min(boxes[w[1]]) - axis.max(boxes[w[0]]))
            .sum();
        (gaps / (order.len() - 1) as f64).max(0.0)
    } else {
        0.0
    };

    InferredFlow {
        axis,
        order,
        spacing,
        counter_align: infer_counter_align(boxes, axis.cross()),
    }
}

/// Exact alignment if there is one, else the alignment that moves the boxes least.
fn infer_counter_align(boxes: &[Rect], cross: Axis) -> StackAlign {
    let edges = |align: StackAlign| -> Vec<f64> {
        boxes
            .iter()
            .map(|b| match align {
                StackAlign::Center => cross.center(*b),
                StackAlign::Max => cross.max(*b),
                _ => cross.min(*b),
            })
            .collect()
    };
    for align in [StackAlign::Min, StackAlign::Center, StackAlign::Max] {
        let values = edges(align);
        if values.iter().all(|v| nearly_equal(*v, values[0])) {
            return align;
        }
    }

    let deviation = |align: StackAlign| -> f64 {
        let values = edges(align);
        match align {
            StackAlign::Max => {
                let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                values.iter().map(|v| hi - v).sum()
            }
            StackAlign::Center => {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                values.iter().map(|v| (v - mean).abs()).sum()
            }
            _ => {
                let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
                values.iter().map(|v| v - lo).sum()
            }
        }
    };
    let mut best = StackAlign::Max;
    let mut best_deviation = deviation(best);
    for align in [StackAlign::Center, StackAlign::Min] {
        let d = deviation(align);
        if d < best_deviation && !nearly_equal(d, best_deviation) {
            best = align;
            best_deviation = d;
        }
    }
    best
}

fn mode_for(axis: Axis) -> StackMode {
    match axis {
        Axis::Horizontal => StackMode::Horizontal,
        Axis::Vertical => StackMode::Vertical,
    }
}

fn hug_props(
    mode: StackMode,
    counter_align: StackAlign,
    padding: Padding,
    spacing: f64,
) -> StackProps {
    StackProps {
        mode,
        primary_sizing: StackSize::Hug,
        counter_sizing: StackSize::Hug,
        primary_align: StackJustify::Min,
        counter_align,
        padding,
        spacing,
        reverse_z_index: false,
    }
}

fn can_layout_in_place(tree: &ElementTree, id: ElementId) -> bool {
    matches!(tree.kind(id), Some(ElementKind::Frame | ElementKind::Group))
        && !tree.is_stack_container(id)
}

/// Turn a selection into an auto-layout container.
///
/// A single frame or group without a stack mode becomes the container itself. Anything else
/// is wrapped in a new frame inserted where the topmost selected sibling was. Direction,
/// order, spacing and counter alignment are inferred from the current layout boxes.
pub fn add_auto_layout(
    tree: &mut ElementTree,
    selection: &[ElementId],
    config: &LayoutConfig,
) -> Result<AddAutoLayout, LayoutError> {
    validate_selection(tree, selection)?;
    let result = match selection {
        [id] if can_layout_in_place(tree, *id) => layout_in_place(tree, *id, config)?,
        _ => wrap_selection(tree, selection, config)?,
    };
    tree.refresh();
    Ok(result)
}

fn layout_in_place(
    tree: &mut ElementTree,
    id: ElementId,
    config: &LayoutConfig,
) -> Result<AddAutoLayout, LayoutError> {
    let previous_order = tree.children_of(id).to_vec();
    let undo = LayoutUndo::capture(tree, &[id]);
    tree.modify(id, true, |n| {
        if n.kind == ElementKind::Frame {
            return false;
        }
        n.kind = ElementKind::Frame;
        true
    });
    for &c in &previous_order {
        clear_fills(tree, c);
    }

    let flow = tree.flow_children(id);
    if flow.is_empty() {
        let props = hug_props(
            StackMode::Vertical,
            StackAlign::Min,
            Padding::uniform(config.default_padding),
            config.default_spacing,
        );
        tree.set_stack_props(id, props);
        tracing::debug!(container = ?id, "added auto layout to empty frame");
        return Ok(AddAutoLayout {
            container: id,
            undo,
        });
    }

    let boxes: Vec<Rect> = flow
        .iter()
        .map(|c| tree.box_in_parent(*c).unwrap_or(Rect::ZERO))
        .collect();
    let inferred = infer_flow(&boxes);
    let size = tree.size(id).unwrap_or(Size::ZERO);
    let union = boxes
        .iter()
        .fold(None, |acc, b| union_rects(acc, Some(*b)))
        .unwrap_or(Rect::ZERO);
    let horizontal = union.x0.min(size.width - union.x1).max(0.0);
    let vertical = union.y0.min(size.height - union.y1).max(0.0);

    // Sorted flow children take over the slots flow children held before.
    let mut order = previous_order.clone();
    let mut sorted = inferred.order.iter().map(|i| flow[*i]);
    for slot in order.iter_mut() {
        if flow.contains(slot)
            && let Some(next) = sorted.next()
        {
            *slot = next;
        }
    }
    for (i, &c) in order.iter().enumerate() {
        tree.insert_child(id, c, i)?;
    }

    let padding = Padding {
        top: vertical,
        right: horizontal,
        bottom: vertical,
        left: horizontal,
    };
    tree.set_stack_props(
        id,
        hug_props(
            mode_for(inferred.axis),
            inferred.counter_align,
            padding,
            inferred.spacing,
        ),
    );
    tracing::debug!(
        container = ?id,
        axis = ?inferred.axis,
        spacing = inferred.spacing,
        "added auto layout in place"
    );
    let restructure = Restructure {
        reordered: (order != previous_order).then_some((id, previous_order)),
        ..Default::default()
    };
    Ok(AddAutoLayout {
        container: id,
        undo: undo.with_restructure(restructure),
    })
}

fn wrap_selection(
    tree: &mut ElementTree,
    selection: &[ElementId],
    config: &LayoutConfig,
) -> Result<AddAutoLayout, LayoutError> {
    let parent = tree
        .parent_of(selection[0])
        .ok_or(LayoutError::MixedParents)?;
    if selection.iter().any(|s| tree.parent_of(*s) != Some(parent)) {
        return Err(LayoutError::MixedParents);
    }
    let undo = LayoutUndo::capture(tree, selection);

    let mut members: Vec<(ElementId, usize)> = selection
        .iter()
        .map(|s| (*s, tree.index_of(*s).unwrap_or(0)))
        .collect();
    members.sort_by_key(|(_, index)| *index);
    members.dedup_by_key(|(id, _)| *id);
    let boxes: Vec<Rect> = members
        .iter()
        .map(|(id, _)| tree.box_in_parent(*id).unwrap_or(Rect::ZERO))
        .collect();
    let union = boxes
        .iter()
        .fold(None, |acc, b| union_rects(acc, Some(*b)))
        .unwrap_or(Rect::ZERO);

    let (axis, order, spacing, counter_align, padding) = if let [only] = boxes.as_slice() {
        let axis = if only.width() >= only.height() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        };
        (
            axis,
            alloc::vec![0],
            config.default_spacing,
            StackAlign::Min,
            Padding::uniform(config.default_padding),
        )
    } else {
        let inferred = infer_flow(&boxes);
        (
            inferred.axis,
            inferred.order,
            inferred.spacing,
            inferred.counter_align,
            Padding::default(),
        )
    };

    let origin = union.origin().to_vec2() - Vec2::new(padding.left, padding.top);
    let wrapper = tree.create_with_kind(ElementKind::Frame);
    tree.set_name(wrapper, config.wrapper_name.clone());
    tree.set_size(
        wrapper,
        Size::new(
            union.width() + padding.left + padding.right,
            union.height() + padding.top + padding.bottom,
        ),
    );
    tree.set_relative_transform(wrapper, Affine::translate(origin));

    let top = members.last().map_or(0, |(_, index)| *index);
    let slot = top + 1 - members.len();
    for &i in &order {
        let (id, _) = members[i];
        let tf = tree.relative_transform(id).unwrap_or(Affine::IDENTITY);
        tree.append_child(wrapper, id)?;
        tree.set_relative_transform(id, Affine::translate(-origin) * tf);
        clear_fills(tree, id);
    }
    tree.insert_child(parent, wrapper, slot)?;
    tree.set_stack_props(
        wrapper,
        hug_props(mode_for(axis), counter_align, padding, spacing),
    );
    tracing::debug!(
        container = ?wrapper,
        members = members.len(),
        ?axis,
        spacing,
        "wrapped selection in auto layout frame"
    );

    let restructure = Restructure {
        wrapper: Some(wrapper),
        moved: members.iter().map(|(id, index)| (*id, parent, *index)).collect(),
        reordered: None,
    };
    Ok(AddAutoLayout {
        container: wrapper,
        undo: undo.with_restructure(restructure),
    })
}

/// Whether adding auto layout to `selection` is likely to keep its arrangement.
///
/// A single frame or group without a stack mode qualifies. Several elements qualify when
/// their world boxes all overlap pairwise along x, or all overlap pairwise along y.
pub fn recommend_auto_layout(tree: &mut ElementTree, selection: &[ElementId]) -> bool {
    match selection {
        [] => false,
        [id] => can_layout_in_place(tree, *id),
        _ => {
            let mut boxes = Vec::with_capacity(selection.len());
            for &id in selection {
                let (Some(tf), Some(size)) = (tree.world_transform(id), tree.size(id)) else {
                    return false;
                };
                boxes.push(transform_rect_bbox(tf, size.to_rect()));
            }
            let all_pairs = |project: fn(Rect) -> Rect| {
                boxes.iter().enumerate().all(|(i, a)| {
                    boxes[i + 1..]
                        .iter()
                        .all(|b| rects_overlap(project(*a), project(*b)))
                })
            };
            all_pairs(|r| Rect::new(r.x0, 0.0, r.x1, 1.0))
                || all_pairs(|r| Rect::new(0.0, r.y0, 1.0, r.y1))
        }
    }
}
