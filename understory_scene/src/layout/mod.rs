// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Auto layout: stack containers that arrange their children along a primary axis.
//!
//! A stack container is any element whose [`StackProps::mode`] is not [`StackMode::None`].
//! Each of its two axes is either [`StackSize::Fixed`] (user-set) or [`StackSize::Hug`]
//! (derived from content). Children contribute a fixed footprint along the primary axis or, when
//! [`StackChildProps::primary_grow`] is `1`, an even share of the leftover space. Along the
//! counter axis a child keeps its size or stretches to the container's inner extent.
//!
//! Layout runs lazily: mutations schedule the highest affected stack ancestor and the next
//! derived read or [`ElementTree::flush`](crate::ElementTree::flush) measures bottom-up and
//! arranges top-down.
//!
//! The command layer ([`UpdateAutoLayout`], [`UpdateAutoLayoutChild`], [`UpdateWhValue`],
//! [`Resize`]) applies partial updates to a batch of elements, resolves grow/hug and
//! space-evenly/hug conflicts, and reports one [`LayoutConflict`] per kind of forced change.

use alloc::string::String;

use kurbo::{Rect, Size};

mod command;
mod conflict;
mod handles;
mod heuristics;
mod resolve;

pub use command::{
    LayoutUndo, Resize, UpdateAutoLayout, UpdateAutoLayoutChild, UpdateWhValue, apply_resize,
    apply_update_auto_layout, apply_update_auto_layout_child, apply_update_wh_value,
};
pub use conflict::{ConflictKind, ConflictReporter, LayoutConflict};
pub use handles::{Handle, HandleRegion, PaddingSide, handle_at, handle_regions};
pub use heuristics::{AddAutoLayout, add_auto_layout, recommend_auto_layout};

/// Stack direction of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackMode {
    /// Not a stack container.
    #[default]
    None,
    /// Children flow left to right.
    Horizontal,
    /// Children flow top to bottom.
    Vertical,
}

impl StackMode {
    /// Physical axis children flow along, `None` when not a stack.
    pub fn primary_axis(self) -> Option<Axis> {
        match self {
            Self::None => None,
            Self::Horizontal => Some(Axis::Horizontal),
            Self::Vertical => Some(Axis::Vertical),
        }
    }

    /// True for `Horizontal` and `Vertical`.
    pub fn is_stack(self) -> bool {
        self != Self::None
    }
}

/// Physical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Width / x.
    Horizontal,
    /// Height / y.
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    pub(crate) fn extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    pub(crate) fn with_extent(self, size: Size, extent: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(extent, size.height),
            Self::Vertical => Size::new(size.width, extent),
        }
    }

    pub(crate) fn min(self, rect: Rect) -> f64 {
        match self {
            Self::Horizontal => rect.x0,
            Self::Vertical => rect.y0,
        }
    }

    pub(crate) fn max(self, rect: Rect) -> f64 {
        match self {
            Self::Horizontal => rect.x1,
            Self::Vertical => rect.y1,
        }
    }

    pub(crate) fn center(self, rect: Rect) -> f64 {
        (self.min(rect) + self.max(rect)) * 0.5
    }
}

/// Sizing of one container axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackSize {
    /// Dimension is user-set.
    #[default]
    Fixed,
    /// Dimension follows the content.
    Hug,
}

/// Distribution along the primary axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackJustify {
    /// Pack at the start.
    #[default]
    Min,
    /// Pack in the middle.
    Center,
    /// Pack at the end.
    Max,
    /// First and last child at the padding edges, equal gaps between.
    SpaceEvenly,
}

/// Alignment along the counter axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackAlign {
    /// Start edge.
    #[default]
    Min,
    /// Centered.
    Center,
    /// End edge.
    Max,
    /// Align first baselines (horizontal stacks only).
    Baseline,
}

/// Counter-axis behavior of a stack child.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackAlignSelf {
    /// Keep own size.
    #[default]
    Auto,
    /// Fill the container's inner counter extent.
    Stretch,
}

/// Whether a child takes part in the flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackPositioning {
    /// In flow.
    #[default]
    Auto,
    /// Out of flow; keeps its transform and paints on top.
    Absolute,
}

/// Container padding in local units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    /// Top.
    pub top: f64,
    /// Right.
    pub right: f64,
    /// Bottom.
    pub bottom: f64,
    /// Left.
    pub left: f64,
}

impl Padding {
    /// Same padding on every side.
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// `(start, end)` padding along `axis`.
    pub fn along(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }
}

/// Auto-layout properties of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StackProps {
    /// Direction; `None` disables layout.
    pub mode: StackMode,
    /// Sizing along the stack direction.
    pub primary_sizing: StackSize,
    /// Sizing across the stack direction.
    pub counter_sizing: StackSize,
    /// Distribution along the primary axis.
    pub primary_align: StackJustify,
    /// Alignment along the counter axis.
    pub counter_align: StackAlign,
    /// Inner padding.
    pub padding: Padding,
    /// Gap between flow children.
    pub spacing: f64,
    /// Flow runs opposite to paint order.
    pub reverse_z_index: bool,
}

impl StackProps {
    /// Sizing of the physical `axis`, `None` when not a stack.
    pub fn sizing_on(&self, axis: Axis) -> Option<StackSize> {
        let primary = self.mode.primary_axis()?;
        Some(if axis == primary {
            self.primary_sizing
        } else {
            self.counter_sizing
        })
    }

    pub(crate) fn set_sizing_on(&mut self, axis: Axis, sizing: StackSize) {
        match self.mode.primary_axis() {
            Some(primary) if primary == axis => self.primary_sizing = sizing,
            Some(_) => self.counter_sizing = sizing,
            None => {}
        }
    }
}

/// Auto-layout properties of a stack child.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StackChildProps {
    /// `1` fills leftover primary space, `0` keeps own size.
    pub primary_grow: f64,
    /// Counter-axis behavior.
    pub align_self: StackAlignSelf,
    /// In or out of flow.
    pub positioning: StackPositioning,
}

impl StackChildProps {
    /// Whether this child fills the physical `axis` of a parent flowing along `parent_primary`.
    pub fn fills(&self, parent_primary: Axis, axis: Axis) -> bool {
        if self.positioning == StackPositioning::Absolute {
            return false;
        }
        if axis == parent_primary {
            self.primary_grow > 0.0
        } else {
            self.align_self == StackAlignSelf::Stretch
        }
    }

    pub(crate) fn set_fill(&mut self, parent_primary: Axis, axis: Axis, fill: bool) {
        if axis == parent_primary {
            self.primary_grow = if fill { 1.0 } else { 0.0 };
        } else {
            self.align_self = if fill {
                StackAlignSelf::Stretch
            } else {
                StackAlignSelf::Auto
            };
        }
    }
}

/// Width/height sizing as presented to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisSizing {
    /// User-set dimension.
    Fixed,
    /// Content-driven dimension.
    Hug,
    /// Space-driven dimension inside a stack parent.
    Fill,
}

/// Text box growth mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAutoResize {
    /// Fixed box.
    #[default]
    None,
    /// Fixed width, height follows the text.
    Height,
    /// Both dimensions follow the text.
    WidthAndHeight,
}

impl TextAutoResize {
    /// Whether `axis` follows the text.
    pub fn hugs(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self == Self::WidthAndHeight,
            Axis::Vertical => self != Self::None,
        }
    }

    /// Mode after making `axis` follow the text (or not), leaving the other axis alone.
    ///
    /// Width can only follow the text when height does too.
    #[must_use]
    pub fn with_axis(self, axis: Axis, hug: bool) -> Self {
        match (axis, hug) {
            (Axis::Horizontal, true) => Self::WidthAndHeight,
            (Axis::Horizontal, false) => {
                if self == Self::WidthAndHeight {
                    Self::Height
                } else {
                    self
                }
            }
            (Axis::Vertical, true) => {
                if self == Self::None {
                    Self::Height
                } else {
                    self
                }
            }
            (Axis::Vertical, false) => Self::None,
        }
    }
}

/// Tunables for auto-layout heuristics and handle hit regions.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Padding used when wrapping a single element or an empty frame.
    pub default_padding: f64,
    /// Spacing used when wrapping a single element or an empty frame.
    pub default_spacing: f64,
    /// Handles thinner than this many screen pixels are not interactive.
    pub min_handle_px: f64,
    /// Screen-space thickness of spacing handles.
    pub spacing_handle_px: f64,
    /// Display name of frames created by wrapping.
    pub wrapper_name: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_padding: 10.0,
            default_spacing: 10.0,
            min_handle_px: 8.0,
            spacing_handle_px: 22.0,
            wrapper_name: String::from("Frame"),
        }
    }
}
