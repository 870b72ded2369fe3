// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a retained element tree for design editors, with derived bounds and stack layout.
//!
//! Understory Scene keeps the document side of a vector or UI editor: a single-rooted tree of
//! elements with transforms, sprites, and effects, and everything an input layer, a renderer, or
//! a history layer needs to read back from it.
//!
//! - Structure: generational [`ElementId`]s, dense sibling indices, cycle-checked insertion,
//!   attachment tracking, and explicit [`ElementTree::destroy`].
//! - Change reporting: [`ElementTree::flush`] returns a [`ChangeSet`] of inserts, removals,
//!   property updates, and derived-geometry changes since the previous flush. Setters ignore
//!   values within [`util::EPSILON`] of the current one, so no-op writes never show up.
//! - Bounds and cascades: world transforms, render bounds (drop shadows, children clips, masks,
//!   layer blur), interact bounds, and mask and blur cascades along the tree.
//! - Spatial queries: [`ElementTree::for_each_intersected_subtree`],
//!   [`ElementTree::is_subtree_full_covered`], and [`ElementTree::hit_test`].
//! - Auto layout: stack containers measured bottom-up and arranged top-down, batched commands with
//!   conflict resolution and undo, and add-auto-layout inference. See [`layout`].
//!
//! ## Laziness
//!
//! Mutations only record what changed. Layout and derived geometry are recomputed on the next
//! derived read (these take `&mut self`), on [`ElementTree::refresh`], or on
//! [`ElementTree::flush`]. Plain property getters such as [`ElementTree::size`] return the last
//! computed values, so call [`ElementTree::refresh`] before reading layout results mid-batch.
//!
//! ## Bounds are boxes
//!
//! Bounds are axis-aligned rectangles in world space. Clip paths and masks clip at the level of
//! their bounding boxes, and rotated content yields loose boxes. Empty content is `None`.
//!
//! ## Example
//!
//! ```
//! use kurbo::Size;
//! use understory_scene::layout::{Padding, StackMode, StackProps, StackSize};
//! use understory_scene::{ElementKind, ElementTree};
//!
//! let mut tree = ElementTree::new();
//! let frame = tree.create_with_kind(ElementKind::Frame);
//! tree.append_child(tree.root(), frame).unwrap();
//! for _ in 0..2 {
//!     let child = tree.create();
//!     tree.set_size(child, Size::new(100.0, 100.0));
//!     tree.append_child(frame, child).unwrap();
//! }
//! tree.set_stack_props(
//!     frame,
//!     StackProps {
//!         mode: StackMode::Horizontal,
//!         primary_sizing: StackSize::Hug,
//!         counter_sizing: StackSize::Hug,
//!         padding: Padding::uniform(10.0),
//!         spacing: 10.0,
//!         ..Default::default()
//!     },
//! );
//!
//! let changes = tree.flush();
//! assert!(changes.inserted().any(|id| id == frame));
//! assert_eq!(tree.size(frame), Some(Size::new(230.0, 120.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod changes;
mod derived;
mod error;
pub mod layout;
mod query;
mod sprite;
mod tree;
mod types;
pub mod util;

pub use changes::{ChangeSet, FlushItem, TreeListener};
pub use error::{LayoutError, TreeError};
pub use sprite::{ShapeGeometry, ShapeSprite, Sprite, query_sprite};
pub use tree::ElementTree;
pub use types::{Color, DropShadow, ElementFlags, ElementId, ElementKind, InnerShadow, MaskType};
