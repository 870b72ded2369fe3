// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element tree: arena storage, structure, property setters, and the flush protocol.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Affine, BezPath, Size};

use crate::changes::ChangeSet;
use crate::derived::Derived;
use crate::error::TreeError;
use crate::layout::{StackChildProps, StackProps, TextAutoResize};
use crate::sprite::{Sprite, query_sprite};
use crate::types::{DropShadow, ElementFlags, ElementId, ElementKind, InnerShadow, MaskType};
use crate::util::{affine_nearly_equal, nearly_equal, size_nearly_equal, snap_to};

/// Effect properties of an element.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Effects {
    pub(crate) drop_shadows: Vec<DropShadow>,
    pub(crate) inner_shadows: Vec<InnerShadow>,
    pub(crate) layer_blur: f64,
    pub(crate) background_blur: f64,
    pub(crate) mask_type: MaskType,
    pub(crate) should_interrupt_mask: bool,
    pub(crate) children_clip_path: Option<BezPath>,
    pub(crate) use_shadow_spread: bool,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            drop_shadows: Vec::new(),
            inner_shadows: Vec::new(),
            layer_blur: 0.0,
            background_blur: 0.0,
            mask_type: MaskType::None,
            should_interrupt_mask: false,
            children_clip_path: None,
            use_shadow_spread: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Dirty {
    /// Own properties or structural links changed since the last flush.
    pub(crate) props: bool,
    /// Derived geometry changed since the last flush.
    pub(crate) derived: bool,
}

#[derive(Debug)]
pub(crate) struct Element {
    generation: u32,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) index: usize,
    pub(crate) level: usize,
    pub(crate) attached: bool,
    pub(crate) kind: ElementKind,
    pub(crate) name: String,
    pub(crate) transform: Affine,
    pub(crate) size: Size,
    pub(crate) flags: ElementFlags,
    pub(crate) opacity: f64,
    pub(crate) sprite: Option<Rc<dyn Sprite>>,
    pub(crate) effects: Effects,
    pub(crate) stack: StackProps,
    pub(crate) stack_child: StackChildProps,
    pub(crate) text_auto_resize: TextAutoResize,
    pub(crate) baseline: Option<f64>,
    pub(crate) derived: Derived,
    pub(crate) dirty: Dirty,
    flushed_attached: bool,
}

impl Element {
    fn new(generation: u32, kind: ElementKind) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            index: 0,
            level: 0,
            attached: false,
            kind,
            name: String::new(),
            transform: Affine::IDENTITY,
            size: Size::ZERO,
            flags: ElementFlags::default(),
            opacity: 1.0,
            sprite: None,
            effects: Effects::default(),
            stack: StackProps::default(),
            stack_child: StackChildProps::default(),
            text_auto_resize: TextAutoResize::None,
            baseline: None,
            derived: Derived::default(),
            dirty: Dirty::default(),
            flushed_attached: false,
        }
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.flags.contains(ElementFlags::VISIBLE)
    }
}

/// A retained tree of elements with one root.
///
/// Elements live in an arena and are addressed by generational [`ElementId`]s. They are created
/// detached, attached by linking them under an attached parent, and destroyed explicitly with
/// [`ElementTree::destroy`].
///
/// Setters ignore values within [`EPSILON`](crate::util::EPSILON) of the current one, so a
/// no-op mutation leaves nothing to flush. Layout and derived geometry are recomputed lazily,
/// on the first derived read or on [`ElementTree::flush`].
pub struct ElementTree {
    slots: Vec<Option<Element>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: ElementId,
    pub(crate) layout_pending: HashSet<ElementId>,
    pub(crate) derived_stale: bool,
    destroyed: Vec<ElementId>,
}

impl core::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("ElementTree")
            .field("root", &self.root)
            .field("elements_total", &total)
            .field("elements_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("layout_pending", &self.layout_pending.len())
            .field("derived_stale", &self.derived_stale)
            .finish_non_exhaustive()
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementTree {
    /// Create a tree with an attached root frame.
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: ElementId::INVALID,
            layout_pending: HashSet::new(),
            derived_stale: true,
            destroyed: Vec::new(),
        };
        let root = tree.create_with_kind(ElementKind::Frame);
        if let Some(n) = tree.get_mut(root) {
            n.attached = true;
            n.flushed_attached = true;
            n.name = String::from("Root");
        }
        tree.root = root;
        tree.refresh();
        for n in tree.slots.iter_mut().flatten() {
            n.dirty = Dirty::default();
        }
        tree
    }

    /// The root element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Allocate a detached leaf element.
    pub fn create(&mut self) -> ElementId {
        self.create_with_kind(ElementKind::Leaf)
    }

    /// Allocate a detached element of the given kind.
    pub fn create_with_kind(&mut self, kind: ElementKind) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Element::new(generation, kind));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Element::new(generation, kind)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.slots.len() - 1) as u32, generation)
        };
        self.derived_stale = true;
        ElementId::new(idx, generation)
    }

    /// Returns true if `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, id: ElementId) -> Option<&Element> {
        let n = self.slots.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let n = self.slots.get_mut(id.idx())?.as_mut()?;
        (n.generation == id.1).then_some(n)
    }

    fn require(&self, id: ElementId) -> Result<&Element, TreeError> {
        self.get(id).ok_or(TreeError::StaleId(id))
    }

    /// Append `child` as the last child of `parent`, moving it from any previous parent.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        let len = self.require(parent)?.children.len();
        let already_here = self.get(child).is_some_and(|c| c.parent == Some(parent));
        let pos = if already_here { len - 1 } else { len };
        self.insert_child(parent, child, pos)
    }

    /// Insert `child` under `parent` at `pos`, moving it from any previous parent.
    ///
    /// Fails without mutating when `child` is `parent` or one of its ancestors.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
        pos: usize,
    ) -> Result<(), TreeError> {
        let len = self.require(parent)?.children.len();
        let current_parent = self.require(child)?.parent;
        if child == self.root {
            tracing::warn!(?parent, "rejected attempt to reparent the root");
            return Err(TreeError::Root);
        }
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!(?parent, ?child, "rejected insertion that would create a cycle");
            return Err(TreeError::Cycle { parent, child });
        }
        let max = if current_parent == Some(parent) {
            len - 1
        } else {
            len
        };
        if pos > max {
            return Err(TreeError::PositionOutOfRange { pos, len: max });
        }

        if let Some(old) = current_parent {
            self.unlink(child, old);
        }
        let (attached, level) = {
            let Some(p) = self.get_mut(parent) else {
                return Err(TreeError::StaleId(parent));
            };
            p.children.insert(pos, child);
            p.dirty.props = true;
            (p.attached, p.level + 1)
        };
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        self.renumber(parent, pos);
        self.set_subtree_attachment(child, attached, level);
        self.schedule_layout(parent);
        self.schedule_layout(child);
        self.derived_stale = true;
        Ok(())
    }

    /// Detach `id` from its parent. Elements without a parent are left alone.
    pub fn remove_from_parent(&mut self, id: ElementId) -> Result<(), TreeError> {
        if let Some(parent) = self.require(id)?.parent {
            self.unlink(id, parent);
            self.set_subtree_attachment(id, false, 0);
            self.derived_stale = true;
        }
        Ok(())
    }

    /// Detach every child of `id` in one batch.
    pub fn clear_children(&mut self, id: ElementId) -> Result<(), TreeError> {
        let children = core::mem::take(&mut self.require_mut(id)?.children);
        if children.is_empty() {
            return Ok(());
        }
        if let Some(n) = self.get_mut(id) {
            n.dirty.props = true;
        }
        for child in children {
            if let Some(c) = self.get_mut(child) {
                c.parent = None;
                c.index = 0;
                c.dirty.props = true;
            }
            self.set_subtree_attachment(child, false, 0);
        }
        self.schedule_layout(id);
        self.derived_stale = true;
        Ok(())
    }

    /// Free a detached element and its subtree. Their ids become stale.
    pub fn destroy(&mut self, id: ElementId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::Root);
        }
        let node = self.require(id)?;
        if node.attached {
            return Err(TreeError::DestroyAttached(id));
        }
        if let Some(parent) = node.parent {
            self.unlink(id, parent);
        }
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(n) = self.slots.get_mut(cur.idx()).and_then(Option::take) else {
                continue;
            };
            if n.flushed_attached {
                self.destroyed.push(cur);
            }
            stack.extend(n.children.iter().copied());
            self.layout_pending.remove(&cur);
            self.free_list.push(cur.idx());
        }
        self.derived_stale = true;
        Ok(())
    }

    fn require_mut(&mut self, id: ElementId) -> Result<&mut Element, TreeError> {
        self.get_mut(id).ok_or(TreeError::StaleId(id))
    }

    pub(crate) fn is_ancestor_or_self(&self, candidate: ElementId, of: ElementId) -> bool {
        let mut cur = Some(of);
        while let Some(id) = cur {
            if id == candidate {
                return true;
            }
            cur = self.get(id).and_then(|n| n.parent);
        }
        false
    }

    fn unlink(&mut self, id: ElementId, parent: ElementId) {
        let mut from = 0;
        if let Some(p) = self.get_mut(parent) {
            if let Some(pos) = p.children.iter().position(|c| *c == id) {
                p.children.remove(pos);
                from = pos;
            }
            p.dirty.props = true;
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
            n.index = 0;
            n.dirty.props = true;
        }
        self.renumber(parent, from);
        self.schedule_layout(parent);
    }

    /// Rewrite sibling indices of `parent`'s children from `from` onwards.
    fn renumber(&mut self, parent: ElementId, from: usize) {
        let children = match self.get(parent) {
            Some(p) => p.children.clone(),
            None => return,
        };
        for (i, c) in children.iter().enumerate().skip(from) {
            if let Some(n) = self.get_mut(*c)
                && n.index != i
            {
                n.index = i;
                n.dirty.props = true;
            }
        }
    }

    fn set_subtree_attachment(&mut self, id: ElementId, attached: bool, level: usize) {
        let mut stack = vec![(id, level)];
        while let Some((cur, lvl)) = stack.pop() {
            let Some(n) = self.get_mut(cur) else {
                continue;
            };
            n.attached = attached;
            n.level = lvl;
            for &c in n.children.iter().rev() {
                stack.push((c, lvl + 1));
            }
        }
    }

    /// Mutate an element through `f`, which reports whether anything changed.
    pub(crate) fn modify(
        &mut self,
        id: ElementId,
        affects_layout: bool,
        f: impl FnOnce(&mut Element) -> bool,
    ) -> bool {
        let Some(n) = self.get_mut(id) else {
            return false;
        };
        if !f(n) {
            return false;
        }
        n.dirty.props = true;
        self.derived_stale = true;
        if affects_layout {
            self.schedule_layout(id);
        }
        true
    }

    /// Write the layout box without scheduling another pass.
    pub(crate) fn write_size(&mut self, id: ElementId, size: Size) -> bool {
        self.modify(id, false, |n| {
            if size_nearly_equal(n.size, size) {
                return false;
            }
            n.size = size;
            true
        })
    }

    /// Write the relative transform without scheduling another pass.
    pub(crate) fn write_transform(&mut self, id: ElementId, tf: Affine) -> bool {
        self.modify(id, false, |n| {
            if affine_nearly_equal(n.transform, tf) {
                return false;
            }
            n.transform = tf;
            true
        })
    }

    pub(crate) fn schedule_layout(&mut self, id: ElementId) {
        if self.is_alive(id) {
            self.layout_pending.insert(id);
        }
    }

    /// Run pending layout and recompute derived geometry.
    ///
    /// Derived reads and [`ElementTree::flush`] call this; call it directly before reading
    /// layout results such as [`ElementTree::size`] after a batch of mutations.
    pub fn refresh(&mut self) {
        if !self.layout_pending.is_empty() {
            self.run_pending_layout();
        }
        if self.derived_stale {
            self.recompute_derived();
            self.derived_stale = false;
        }
    }

    /// Ids of every parentless live element, root first.
    pub(crate) fn top_level(&self) -> Vec<ElementId> {
        let mut out = vec![self.root];
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(n) = slot
                && n.parent.is_none()
            {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "ElementId uses 32-bit indices by design."
                )]
                let id = ElementId::new(i as u32, n.generation);
                if id != self.root {
                    out.push(id);
                }
            }
        }
        out
    }

    /// Pre-order traversal of the subtree at `id`.
    pub(crate) fn preorder(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(n) = self.get(cur) else {
                continue;
            };
            out.push(cur);
            stack.extend(n.children.iter().rev().copied());
        }
        out
    }

    /// Run pending work and return everything that changed since the previous flush.
    pub fn flush(&mut self) -> ChangeSet {
        self.refresh();
        let mut inserted = Vec::new();
        let mut updated = Vec::new();
        let mut dirty = Vec::new();
        for id in self.preorder(self.root) {
            let Some(n) = self.get(id) else {
                continue;
            };
            if !n.flushed_attached {
                inserted.push(id);
            } else if n.dirty.props {
                updated.push(id);
            } else if n.dirty.derived {
                dirty.push(id);
            }
        }
        let mut removed = core::mem::take(&mut self.destroyed);
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(n) = slot else {
                continue;
            };
            if n.flushed_attached && !n.attached {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "ElementId uses 32-bit indices by design."
                )]
                removed.push(ElementId::new(i as u32, n.generation));
            }
            n.flushed_attached = n.attached;
            n.dirty = Dirty::default();
        }
        let changes = ChangeSet::from_groups(inserted, removed, updated, dirty);
        if !changes.is_empty() {
            tracing::debug!(items = changes.items().len(), "flushed element tree");
        }
        changes
    }

    /// Flush and replay the change set into `listener`.
    pub fn flush_into(&mut self, listener: &mut dyn crate::changes::TreeListener) -> ChangeSet {
        let changes = self.flush();
        changes.dispatch(listener);
        changes
    }
}

// Structural accessors.
impl ElementTree {
    /// Parent of a live element.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent
    }

    /// Children in paint order; empty for stale ids.
    pub fn children_of(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position among siblings (0 for the root and parentless elements).
    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        Some(self.get(id)?.index)
    }

    /// Depth below the top of the element's tree (0 for the root).
    pub fn hierarchy_level(&self, id: ElementId) -> Option<usize> {
        Some(self.get(id)?.level)
    }

    /// Whether the element is reachable from the root.
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|n| n.attached)
    }

    /// Kind of a live element.
    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        Some(self.get(id)?.kind)
    }
}

// Own properties.
impl ElementTree {
    /// Display name.
    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    /// Set the display name.
    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) {
        let name = name.into();
        self.modify(id, false, |n| {
            if n.name == name {
                return false;
            }
            n.name = name;
            true
        });
    }

    /// Transform relative to the parent.
    pub fn relative_transform(&self, id: ElementId) -> Option<Affine> {
        Some(self.get(id)?.transform)
    }

    /// Set the transform relative to the parent.
    pub fn set_relative_transform(&mut self, id: ElementId, tf: Affine) {
        if self.write_transform(id, tf) {
            self.schedule_layout(id);
        }
    }

    /// Layout box size in local space.
    pub fn size(&self, id: ElementId) -> Option<Size> {
        Some(self.get(id)?.size)
    }

    /// Set the layout box size.
    pub fn set_size(&mut self, id: ElementId, size: Size) {
        if self.write_size(id, size) {
            self.schedule_layout(id);
        }
    }

    /// Visibility and interaction flags.
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        Some(self.get(id)?.flags)
    }

    /// Own visibility flag.
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(Element::is_visible)
    }

    /// Set the own visibility flag.
    pub fn set_visible(&mut self, id: ElementId, visible: bool) {
        self.set_flag(id, ElementFlags::VISIBLE, visible, true);
    }

    /// Own interaction flag.
    pub fn is_interactive(&self, id: ElementId) -> bool {
        self.get(id)
            .is_some_and(|n| n.flags.contains(ElementFlags::INTERACTIVE))
    }

    /// Set the own interaction flag.
    pub fn set_interactive(&mut self, id: ElementId, interactive: bool) {
        self.set_flag(id, ElementFlags::INTERACTIVE, interactive, false);
    }

    fn set_flag(&mut self, id: ElementId, flag: ElementFlags, on: bool, affects_layout: bool) {
        self.modify(id, affects_layout, |n| {
            if n.flags.contains(flag) == on {
                return false;
            }
            n.flags.set(flag, on);
            true
        });
    }

    /// Opacity in `0..=1`.
    pub fn opacity(&self, id: ElementId) -> Option<f64> {
        Some(self.get(id)?.opacity)
    }

    /// Set opacity; values within epsilon of 0 or 1 snap to them.
    pub fn set_opacity(&mut self, id: ElementId, opacity: f64) {
        let opacity = snap_to(snap_to(opacity.clamp(0.0, 1.0), 0.0), 1.0);
        self.modify(id, false, |n| {
            if nearly_equal(n.opacity, opacity) {
                return false;
            }
            n.opacity = opacity;
            true
        });
    }

    /// Attached sprite.
    pub fn sprite(&self, id: ElementId) -> Option<&Rc<dyn Sprite>> {
        self.get(id)?.sprite.as_ref()
    }

    /// The sprite as `T`, searching its capability chain.
    pub fn sprite_as<T: Sprite>(&self, id: ElementId) -> Option<&T> {
        query_sprite::<T>(self.sprite(id)?.as_ref())
    }

    /// Replace the sprite.
    pub fn set_sprite(&mut self, id: ElementId, sprite: Option<Rc<dyn Sprite>>) {
        self.modify(id, false, |n| {
            let same = match (&n.sprite, &sprite) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same {
                return false;
            }
            n.sprite = sprite;
            true
        });
    }

    /// Text growth mode.
    pub fn text_auto_resize(&self, id: ElementId) -> Option<TextAutoResize> {
        Some(self.get(id)?.text_auto_resize)
    }

    /// Set the text growth mode.
    pub fn set_text_auto_resize(&mut self, id: ElementId, mode: TextAutoResize) {
        self.modify(id, true, |n| {
            if n.text_auto_resize == mode {
                return false;
            }
            n.text_auto_resize = mode;
            true
        });
    }

    /// Distance from the top of the box to the first baseline.
    pub fn baseline(&self, id: ElementId) -> Option<f64> {
        self.get(id)?.baseline
    }

    /// Set the first-baseline offset used by baseline alignment.
    pub fn set_baseline(&mut self, id: ElementId, baseline: Option<f64>) {
        self.modify(id, true, |n| {
            let same = match (n.baseline, baseline) {
                (Some(a), Some(b)) => nearly_equal(a, b),
                (None, None) => true,
                _ => false,
            };
            if same {
                return false;
            }
            n.baseline = baseline;
            true
        });
    }

    /// Auto-layout container properties.
    pub fn stack_props(&self, id: ElementId) -> Option<&StackProps> {
        Some(&self.get(id)?.stack)
    }

    /// Replace the auto-layout container properties without conflict resolution.
    pub fn set_stack_props(&mut self, id: ElementId, props: StackProps) {
        let changed = self.modify(id, true, |n| {
            if n.stack == props {
                return false;
            }
            n.stack = props;
            true
        });
        if changed {
            self.schedule_children(id);
        }
    }

    /// Auto-layout child properties.
    pub fn stack_child_props(&self, id: ElementId) -> Option<&StackChildProps> {
        Some(&self.get(id)?.stack_child)
    }

    /// Replace the auto-layout child properties without conflict resolution.
    pub fn set_stack_child_props(&mut self, id: ElementId, props: StackChildProps) {
        self.modify(id, true, |n| {
            if n.stack_child == props {
                return false;
            }
            n.stack_child = props;
            true
        });
    }

    fn schedule_children(&mut self, id: ElementId) {
        let children = self.children_of(id).to_vec();
        for c in children {
            self.schedule_layout(c);
        }
    }
}

// Effects.
impl ElementTree {
    /// Drop shadows as set.
    pub fn drop_shadows(&self, id: ElementId) -> &[DropShadow] {
        self.get(id)
            .map(|n| n.effects.drop_shadows.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the drop shadows.
    pub fn set_drop_shadows(&mut self, id: ElementId, shadows: Vec<DropShadow>) {
        self.modify(id, false, |n| {
            if n.effects.drop_shadows == shadows {
                return false;
            }
            n.effects.drop_shadows = shadows;
            true
        });
    }

    /// Inner shadows as set.
    pub fn inner_shadows(&self, id: ElementId) -> &[InnerShadow] {
        self.get(id)
            .map(|n| n.effects.inner_shadows.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the inner shadows.
    pub fn set_inner_shadows(&mut self, id: ElementId, shadows: Vec<InnerShadow>) {
        self.modify(id, false, |n| {
            if n.effects.inner_shadows == shadows {
                return false;
            }
            n.effects.inner_shadows = shadows;
            true
        });
    }

    /// Layer blur radius.
    pub fn layer_blur(&self, id: ElementId) -> Option<f64> {
        Some(self.get(id)?.effects.layer_blur)
    }

    /// Set the layer blur; near-zero snaps to 0.
    pub fn set_layer_blur(&mut self, id: ElementId, blur: f64) {
        let blur = snap_to(blur, 0.0);
        self.modify(id, false, |n| {
            if nearly_equal(n.effects.layer_blur, blur) {
                return false;
            }
            n.effects.layer_blur = blur;
            true
        });
    }

    /// Background blur radius.
    pub fn background_blur(&self, id: ElementId) -> Option<f64> {
        Some(self.get(id)?.effects.background_blur)
    }

    /// Set the background blur; near-zero snaps to 0.
    pub fn set_background_blur(&mut self, id: ElementId, blur: f64) {
        let blur = snap_to(blur, 0.0);
        self.modify(id, false, |n| {
            if nearly_equal(n.effects.background_blur, blur) {
                return false;
            }
            n.effects.background_blur = blur;
            true
        });
    }

    /// Mask behavior.
    pub fn mask_type(&self, id: ElementId) -> Option<MaskType> {
        Some(self.get(id)?.effects.mask_type)
    }

    /// Set the mask behavior.
    pub fn set_mask_type(&mut self, id: ElementId, mask_type: MaskType) {
        self.modify(id, false, |n| {
            if n.effects.mask_type == mask_type {
                return false;
            }
            n.effects.mask_type = mask_type;
            true
        });
    }

    /// Whether this element ends a preceding sibling's mask.
    pub fn should_interrupt_mask(&self, id: ElementId) -> bool {
        self.get(id)
            .is_some_and(|n| n.effects.should_interrupt_mask)
    }

    /// Set whether this element ends a preceding sibling's mask.
    pub fn set_should_interrupt_mask(&mut self, id: ElementId, interrupt: bool) {
        self.modify(id, false, |n| {
            if n.effects.should_interrupt_mask == interrupt {
                return false;
            }
            n.effects.should_interrupt_mask = interrupt;
            true
        });
    }

    /// Clip applied to children, in local space.
    pub fn children_clip_path(&self, id: ElementId) -> Option<&BezPath> {
        self.get(id)?.effects.children_clip_path.as_ref()
    }

    /// Set or clear the clip applied to children.
    pub fn set_children_clip_path(&mut self, id: ElementId, clip: Option<BezPath>) {
        self.modify(id, false, |n| {
            if n.effects.children_clip_path == clip {
                return false;
            }
            n.effects.children_clip_path = clip;
            true
        });
    }

    /// Whether shadow spread is honored.
    pub fn should_use_shadow_spread(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|n| n.effects.use_shadow_spread)
    }

    /// Honor or ignore shadow spread.
    pub fn set_should_use_shadow_spread(&mut self, id: ElementId, use_spread: bool) {
        self.modify(id, false, |n| {
            if n.effects.use_shadow_spread == use_spread {
                return false;
            }
            n.effects.use_shadow_spread = use_spread;
            true
        });
    }
}
