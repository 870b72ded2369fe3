// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paintable content attached to elements.
//!
//! A [`Sprite`] supplies fill and stroke geometry in the element's local space. Concrete sprites
//! may extend a base sprite by returning it from [`Sprite::base`]; [`query_sprite`] walks that
//! chain, so asking a derived sprite for its base type succeeds while the reverse does not.

use core::any::Any;
use core::fmt::Debug;

use kurbo::{BezPath, Rect, Shape, Size};

/// Geometry provider for an element.
pub trait Sprite: Any + Debug {
    /// Fill geometry for an element of the given layout size, `None` when nothing is filled.
    fn fill_path(&self, size: Size) -> Option<BezPath>;

    /// Stroke outline geometry, `None` when nothing is stroked.
    fn stroke_path(&self, size: Size) -> Option<BezPath> {
        let _ = size;
        None
    }

    /// The sprite this one extends, if any.
    fn base(&self) -> Option<&dyn Sprite> {
        None
    }
}

/// Find `T` in the capability chain of `sprite`.
pub fn query_sprite<T: Sprite>(sprite: &dyn Sprite) -> Option<&T> {
    let mut current = Some(sprite);
    while let Some(s) = current {
        let any: &dyn Any = s;
        if let Some(found) = any.downcast_ref::<T>() {
            return Some(found);
        }
        current = s.base();
    }
    None
}

/// Where a [`ShapeSprite`] gets its outline.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeGeometry {
    /// The element's layout box, `(0, 0)` to its size.
    LayoutBox,
    /// A fixed path in local space.
    Path(BezPath),
}

/// A shape with optional fill and stroke sharing one outline.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSprite {
    geometry: ShapeGeometry,
    fill: bool,
    stroke: bool,
}

impl ShapeSprite {
    /// Filled shape tracking the element's layout box.
    pub fn layout_box() -> Self {
        Self::new(ShapeGeometry::LayoutBox)
    }

    /// Filled rectangle of a fixed size at the local origin.
    pub fn rect(width: f64, height: f64) -> Self {
        Self::new(ShapeGeometry::Path(
            Rect::new(0.0, 0.0, width, height).to_path(0.1),
        ))
    }

    /// Filled shape with the given geometry.
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            geometry,
            fill: true,
            stroke: false,
        }
    }

    /// Enable or disable the fill.
    #[must_use]
    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Enable or disable the stroke.
    #[must_use]
    pub fn with_stroke(mut self, stroke: bool) -> Self {
        self.stroke = stroke;
        self
    }

    fn outline(&self, size: Size) -> BezPath {
        match &self.geometry {
            ShapeGeometry::LayoutBox => size.to_rect().to_path(0.1),
            ShapeGeometry::Path(path) => path.clone(),
        }
    }
}

impl Sprite for ShapeSprite {
    fn fill_path(&self, size: Size) -> Option<BezPath> {
        self.fill.then(|| self.outline(size))
    }

    fn stroke_path(&self, size: Size) -> Option<BezPath> {
        self.stroke.then(|| self.outline(size))
    }
}
