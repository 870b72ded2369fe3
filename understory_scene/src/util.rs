// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry helpers shared by the tree, the bounds engine, and the layout resolver.

use kurbo::{Affine, BezPath, Rect, Shape, Size};

/// Relative tolerance used by setter no-op guards and snapping.
pub const EPSILON: f64 = 1e-4;

/// Relative epsilon comparison: `|a - b| <= EPSILON * max(1, |a|, |b|)`.
pub fn nearly_equal(a: f64, b: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= EPSILON * scale
}

/// Snap `value` onto `target` when the two are within [`EPSILON`].
pub(crate) fn snap_to(value: f64, target: f64) -> f64 {
    if nearly_equal(value, target) {
        target
    } else {
        value
    }
}

pub(crate) fn affine_nearly_equal(a: Affine, b: Affine) -> bool {
    a.as_coeffs()
        .iter()
        .zip(b.as_coeffs().iter())
        .all(|(x, y)| nearly_equal(*x, *y))
}

pub(crate) fn size_nearly_equal(a: Size, b: Size) -> bool {
    nearly_equal(a.width, b.width) && nearly_equal(a.height, b.height)
}

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in the target space.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

/// Union where `None` is the empty set.
pub(crate) fn union_rects(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (Some(r), None) | (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

/// Intersection where `None` is the empty set.
///
/// Rectangles that only touch produce a degenerate (zero-area) result rather than `None`.
pub(crate) fn intersect_rects(a: Rect, b: Rect) -> Option<Rect> {
    let r = Rect::new(a.x0.max(b.x0), a.y0.max(b.y0), a.x1.min(b.x1), a.y1.min(b.y1));
    (r.x0 <= r.x1 && r.y0 <= r.y1).then_some(r)
}

/// Strict overlap: rectangles sharing only an edge do not intersect.
pub(crate) fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// `outer` contains `inner` (edges inclusive).
pub(crate) fn rect_contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

/// Bounds of a path, `None` when the path draws nothing.
pub(crate) fn path_bounds(path: &BezPath) -> Option<Rect> {
    if path.segments().next().is_none() {
        return None;
    }
    Some(path.bounding_box())
}

/// Append the sub-paths of `other` to `dst`.
pub(crate) fn union_paths(dst: &mut BezPath, other: &BezPath) {
    for el in other.elements() {
        dst.push(*el);
    }
}
