// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive regions for adjusting a stack container's padding and spacing.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use super::{Axis, LayoutConfig};
use crate::error::LayoutError;
use crate::tree::ElementTree;
use crate::types::ElementId;
use crate::util::transform_rect_bbox;

/// One side of a container's padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaddingSide {
    /// Top.
    Top,
    /// Right.
    Right,
    /// Bottom.
    Bottom,
    /// Left.
    Left,
}

/// What a pointer over a stack container would manipulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    /// A padding band.
    Padding(PaddingSide),
    /// The gap after the flow child at this flow position.
    Spacing(usize),
    /// A flow child.
    Content(ElementId),
}

/// A handle and its world-space hit rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleRegion {
    /// The handle.
    pub handle: Handle,
    /// Hit rectangle in world space.
    pub rect: Rect,
}

/// Hit regions of `container` in priority order: padding, then spacing, then content.
///
/// `zoom` converts world units to screen pixels. Padding bands and gaps narrower than
/// [`LayoutConfig::min_handle_px`] on screen are left out; gaps that qualify are widened to
/// [`LayoutConfig::spacing_handle_px`] around their center.
pub fn handle_regions(
    tree: &mut ElementTree,
    container: ElementId,
    zoom: f64,
    config: &LayoutConfig,
) -> Result<Vec<HandleRegion>, LayoutError> {
    let Some(props) = tree.stack_props(container).copied() else {
        return Err(LayoutError::NotStackContainer(container));
    };
    let Some(axis) = props.mode.primary_axis() else {
        return Err(LayoutError::NotStackContainer(container));
    };
    let world = tree
        .world_transform(container)
        .ok_or(LayoutError::NotStackContainer(container))?;
    let size = tree.size(container).unwrap_or_default();
    let (w, h) = (size.width, size.height);
    let p = props.padding;
    let min_world = config.min_handle_px / zoom;
    let mut regions = Vec::new();

    let bands = [
        (PaddingSide::Top, Rect::new(0.0, 0.0, w, p.top), Axis::Vertical),
        (PaddingSide::Right, Rect::new(w - p.right, 0.0, w, h), Axis::Horizontal),
        (PaddingSide::Bottom, Rect::new(0.0, h - p.bottom, w, h), Axis::Vertical),
        (PaddingSide::Left, Rect::new(0.0, 0.0, p.left, h), Axis::Horizontal),
    ];
    for (side, local, thickness_axis) in bands {
        let rect = transform_rect_bbox(world, local);
        if thickness_axis.extent(rect.size()) >= min_world {
            regions.push(HandleRegion {
                handle: Handle::Padding(side),
                rect,
            });
        }
    }

    let flow = tree.flow_children(container);
    let boxes: Vec<Rect> = flow
        .iter()
        .map(|c| tree.box_in_parent(*c).unwrap_or(Rect::ZERO))
        .collect();
    let cross = axis.cross();
    let (c_start, c_end) = p.along(cross);
    let counter_span = (c_start, cross.extent(size) - c_end);
    for (i, pair) in boxes.windows(2).enumerate() {
        let (gap_start, gap_end) = (axis.max(pair[0]), axis.min(pair[1]));
        let gap = transform_rect_bbox(world, span_rect(axis, (gap_start, gap_end), counter_span));
        if axis.extent(gap.size()) < min_world {
            continue;
        }
        let half = (config.spacing_handle_px / zoom) * 0.5;
        let mid = axis.center(gap);
        let hit = match axis {
            Axis::Horizontal if gap.width() < 2.0 * half => {
                Rect::new(mid - half, gap.y0, mid + half, gap.y1)
            }
            Axis::Vertical if gap.height() < 2.0 * half => {
                Rect::new(gap.x0, mid - half, gap.x1, mid + half)
            }
            _ => gap,
        };
        regions.push(HandleRegion {
            handle: Handle::Spacing(i),
            rect: hit,
        });
    }

    for (&child, local) in flow.iter().zip(&boxes) {
        regions.push(HandleRegion {
            handle: Handle::Content(child),
            rect: transform_rect_bbox(world, *local),
        });
    }
    Ok(regions)
}

/// Rectangle covering `primary` along `axis` and `counter` across it.
fn span_rect(axis: Axis, primary: (f64, f64), counter: (f64, f64)) -> Rect {
    match axis {
        Axis::Horizontal => Rect::new(primary.0, counter.0, primary.1, counter.1),
        Axis::Vertical => Rect::new(counter.0, primary.0, counter.1, primary.1),
    }
}

/// Highest-priority handle of `container` under the world-space `point`.
pub fn handle_at(
    tree: &mut ElementTree,
    container: ElementId,
    point: Point,
    zoom: f64,
    config: &LayoutConfig,
) -> Result<Option<Handle>, LayoutError> {
    Ok(handle_regions(tree, container, zoom, config)?
        .into_iter()
        .find(|r| r.rect.contains(point))
        .map(|r| r.handle))
}
