// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: identifiers, flags, kinds, and effect descriptors.

use kurbo::Vec2;

/// Identifier for an element in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    /// Sentinel that never refers to a live element.
    pub const INVALID: Self = Self(u32::MAX, 0);

    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Returns `false` for [`ElementId::INVALID`].
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

bitflags::bitflags! {
    /// Element flags controlling visibility and interaction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is visible (participates in rendering, masking and layout flow).
        const VISIBLE     = 0b0000_0001;
        /// Element takes part in hit and rectangle testing.
        const INTERACTIVE = 0b0000_0010;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::INTERACTIVE
    }
}

/// What an element represents in the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A box that can clip and host an auto-layout stack.
    Frame,
    /// A grouping of children without a box of its own.
    Group,
    /// A plain shape.
    #[default]
    Leaf,
    /// A text run; carries a [`TextAutoResize`](crate::layout::TextAutoResize) mode.
    Text,
}

/// Masking behavior of an element over its later siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaskType {
    /// Not a mask.
    #[default]
    None,
    /// Mask by geometry coverage.
    Opaque,
    /// Mask by alpha.
    Alpha,
    /// Mask by luminance.
    Luminance,
}

/// Straight-alpha RGBA color with components in `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::rgba(1.0, 0.0, 0.0, 1.0);

    /// Build a color from components.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.25)
    }
}

/// Drop shadow painted outside the element's content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DropShadow {
    /// Shadow color.
    pub color: Color,
    /// Offset in local space.
    pub offset: Vec2,
    /// Blur radius.
    pub radius: f64,
    /// Outward dilation of the shadow shape.
    pub spread: f64,
    /// Paint the shadow under translucent content too.
    pub show_shadow_behind_node: bool,
}

/// Shadow painted inside the element's fill.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InnerShadow {
    /// Shadow color.
    pub color: Color,
    /// Offset in local space.
    pub offset: Vec2,
    /// Blur radius.
    pub radius: f64,
    /// Inward dilation of the shadow shape.
    pub spread: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_is_not_valid() {
        assert!(!ElementId::INVALID.is_valid());
        assert!(ElementId::new(0, 1).is_valid());
    }

    #[test]
    fn default_flags_are_visible_and_interactive() {
        let flags = ElementFlags::default();
        assert!(flags.contains(ElementFlags::VISIBLE | ElementFlags::INTERACTIVE));
    }
}
