// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for structural and layout operations.

use thiserror::Error;

use crate::types::ElementId;

/// A rejected structural mutation. The tree is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The handle does not refer to a live element.
    #[error("element {0:?} is stale")]
    StaleId(ElementId),
    /// The child is the parent itself or one of its ancestors.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Requested parent.
        parent: ElementId,
        /// Requested child.
        child: ElementId,
    },
    /// Insert position past the end of the child list.
    #[error("position {pos} is out of range for {len} children")]
    PositionOutOfRange {
        /// Requested position.
        pos: usize,
        /// Current child count.
        len: usize,
    },
    /// The root cannot be reparented or destroyed.
    #[error("the root element cannot be moved or destroyed")]
    Root,
    /// Only detached elements can be destroyed.
    #[error("element {0:?} is attached to the tree")]
    DestroyAttached(ElementId),
}

/// A rejected layout command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Nothing was selected.
    #[error("the selection is empty")]
    EmptySelection,
    /// Wrapping requires every selected element to share a parent.
    #[error("the selected elements do not share a parent")]
    MixedParents,
    /// The element has no stack mode.
    #[error("element {0:?} is not a stack container")]
    NotStackContainer(ElementId),
    /// The element's parent has no stack mode.
    #[error("element {0:?} is not a child of a stack container")]
    NotStackChild(ElementId),
    /// Structural failure while applying the command.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
