// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds and cascade engine: world transforms, visibility, mask and blur cascades, content,
//! render and interact bounds, and self shadow geometry.
//!
//! Everything here is a pure function of the tree's own properties. The results are cached per
//! element and rebuilt in one batched pass the first time they are read after a mutation:
//!
//! 1. top-down: world transform, tree visibility/interactivity, mask membership, sibling mask ids;
//! 2. bottom-up: own sprite bounds and tree content bounds in local space;
//! 3. top-down: inherited clips (ancestor children clips and the masking sibling), render and
//!    interact bounds in world space;
//! 4. bottom-up: tree interact bounds.
//!
//! Clips are applied at bounding-box granularity. Layer blur dilates render bounds after clipping,
//! so a blur halo extends past the clip edge.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Rect, Shape};
use smallvec::SmallVec;

use crate::tree::{Effects, Element, ElementTree};
use crate::types::{DropShadow, ElementFlags, ElementId, InnerShadow, MaskType};
use crate::util::{
    intersect_rects, nearly_equal, path_bounds, transform_rect_bbox, union_paths, union_rects,
};

/// Accumulated world-space clip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum Clip {
    #[default]
    Unbounded,
    Rect(Rect),
    Empty,
}

impl Clip {
    /// Narrow by `rect`; `None` means the narrowing region is empty.
    fn intersect(self, rect: Option<Rect>) -> Self {
        let Some(r) = rect else {
            return Self::Empty;
        };
        match self {
            Self::Unbounded => Self::Rect(r),
            Self::Rect(c) => intersect_rects(c, r).map_or(Self::Empty, Self::Rect),
            Self::Empty => Self::Empty,
        }
    }

    fn apply(self, rect: Option<Rect>) -> Option<Rect> {
        match self {
            Self::Unbounded => rect,
            Self::Rect(c) => rect.and_then(|r| intersect_rects(r, c)),
            Self::Empty => None,
        }
    }
}

/// Cached derived state of one element.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Derived {
    pub(crate) world_transform: Affine,
    pub(crate) tree_visible: bool,
    pub(crate) tree_interactive: bool,
    pub(crate) in_mask: bool,
    pub(crate) mask_id: ElementId,
    /// Own sprite bounds, local space.
    pub(crate) own_content: Option<Rect>,
    /// Own sprite plus visible descendants, local space.
    pub(crate) tree_content: Option<Rect>,
    /// Clip handed to children, world space.
    pub(crate) children_clip: Clip,
    pub(crate) render_bounds: Option<Rect>,
    pub(crate) interact_bounds: Option<Rect>,
    pub(crate) tree_interact_bounds: Option<Rect>,
}

impl Default for Derived {
    fn default() -> Self {
        Self {
            world_transform: Affine::IDENTITY,
            tree_visible: false,
            tree_interactive: false,
            in_mask: false,
            mask_id: ElementId::INVALID,
            own_content: None,
            tree_content: None,
            children_clip: Clip::Unbounded,
            render_bounds: None,
            interact_bounds: None,
            tree_interact_bounds: None,
        }
    }
}

fn sprite_bounds(n: &Element) -> Option<Rect> {
    let sprite = n.sprite.as_ref()?;
    let fill = sprite.fill_path(n.size).as_ref().and_then(path_bounds);
    let stroke = sprite.stroke_path(n.size).as_ref().and_then(path_bounds);
    union_rects(fill, stroke)
}

fn effective_spread(effects: &Effects, spread: f64) -> f64 {
    if effects.use_shadow_spread { spread } else { 0.0 }
}

fn dilate_by_shadows(content: Rect, effects: &Effects) -> Rect {
    effects.drop_shadows.iter().fold(content, |acc, s| {
        let grow = (effective_spread(effects, s.spread) + s.radius).max(0.0);
        acc.union(content.inflate(grow, grow) + s.offset)
    })
}

impl ElementTree {
    /// Rebuild every element's derived state and flag the ones that changed.
    pub(crate) fn recompute_derived(&mut self) {
        let mut order = Vec::new();
        for top in self.top_level() {
            order.extend(self.preorder(top));
        }
        let mut fresh = vec![Derived::default(); self.slot_count()];

        for &id in &order {
            let Some(n) = self.get(id) else {
                continue;
            };
            let (parent_tf, parent_visible, parent_interactive, parent_in_mask) =
                match n.parent {
                    Some(p) => {
                        let d = &fresh[p.idx()];
                        (d.world_transform, d.tree_visible, d.tree_interactive, d.in_mask)
                    }
                    None => (Affine::IDENTITY, true, true, false),
                };
            let d = &mut fresh[id.idx()];
            d.world_transform = parent_tf * n.transform;
            d.tree_visible = parent_visible && n.is_visible();
            d.tree_interactive =
                parent_interactive && n.flags.contains(ElementFlags::INTERACTIVE);
            d.in_mask =
                d.tree_visible && (n.effects.mask_type != MaskType::None || parent_in_mask);

            // A visible mask covers later siblings until an interrupter or the next mask.
            let mut current = ElementId::INVALID;
            for &c in &n.children {
                let Some(cn) = self.get(c) else {
                    continue;
                };
                let mask_id = if cn.effects.mask_type != MaskType::None && cn.is_visible() {
                    current = c;
                    ElementId::INVALID
                } else if cn.effects.should_interrupt_mask {
                    current = ElementId::INVALID;
                    ElementId::INVALID
                } else {
                    current
                };
                fresh[c.idx()].mask_id = mask_id;
            }
        }

        for &id in order.iter().rev() {
            let Some(n) = self.get(id) else {
                continue;
            };
            let own = sprite_bounds(n);
            let mut content = own;
            for &c in &n.children {
                let Some(cn) = self.get(c) else {
                    continue;
                };
                if !cn.is_visible() {
                    continue;
                }
                let child = fresh[c.idx()]
                    .tree_content
                    .map(|r| transform_rect_bbox(cn.transform, r));
                content = union_rects(content, child);
            }
            let d = &mut fresh[id.idx()];
            d.own_content = own;
            d.tree_content = content;
        }

        for &id in &order {
            let Some(n) = self.get(id) else {
                continue;
            };
            let mut clip = n
                .parent
                .map_or(Clip::Unbounded, |p| fresh[p.idx()].children_clip);
            let d = &fresh[id.idx()];
            if d.mask_id.is_valid() {
                let m = &fresh[d.mask_id.idx()];
                clip = clip.intersect(
                    m.tree_content
                        .map(|r| transform_rect_bbox(m.world_transform, r)),
                );
            }
            let world = d.world_transform;
            let own = d.own_content;
            let interact = clip.apply(own.map(|r| transform_rect_bbox(world, r)));
            let blur = n.effects.layer_blur;
            let render = clip
                .apply(own.map(|r| transform_rect_bbox(world, dilate_by_shadows(r, &n.effects))))
                .map(|r| if blur > 0.0 { r.inflate(blur, blur) } else { r });
            let children_clip = match &n.effects.children_clip_path {
                Some(path) => {
                    clip.intersect(path_bounds(path).map(|r| transform_rect_bbox(world, r)))
                }
                None => clip,
            };
            let d = &mut fresh[id.idx()];
            d.interact_bounds = interact;
            d.render_bounds = render;
            d.children_clip = children_clip;
        }

        for &id in order.iter().rev() {
            let Some(n) = self.get(id) else {
                continue;
            };
            let d = &fresh[id.idx()];
            let mut acc = if d.tree_visible && d.tree_interactive {
                d.interact_bounds
            } else {
                None
            };
            for &c in &n.children {
                acc = union_rects(acc, fresh[c.idx()].tree_interact_bounds);
            }
            fresh[id.idx()].tree_interact_bounds = acc;
        }

        let mut changed = 0_usize;
        for &id in &order {
            let d = core::mem::take(&mut fresh[id.idx()]);
            if let Some(n) = self.get_mut(id)
                && n.derived != d
            {
                n.derived = d;
                n.dirty.derived = true;
                changed += 1;
            }
        }
        tracing::trace!(elements = order.len(), changed, "recomputed derived geometry");
    }

    pub(crate) fn derived(&mut self, id: ElementId) -> Option<&Derived> {
        self.refresh();
        self.get(id).map(|n| &n.derived)
    }

    /// Local-to-world transform.
    pub fn world_transform(&mut self, id: ElementId) -> Option<Affine> {
        Some(self.derived(id)?.world_transform)
    }

    /// Visible along the whole ancestor chain.
    pub fn is_tree_visible(&mut self, id: ElementId) -> bool {
        self.derived(id).is_some_and(|d| d.tree_visible)
    }

    /// Interactive along the whole ancestor chain.
    pub fn is_tree_interactive(&mut self, id: ElementId) -> bool {
        self.derived(id).is_some_and(|d| d.tree_interactive)
    }

    /// Eligible for point hit testing.
    pub fn is_hit_testable(&mut self, id: ElementId) -> bool {
        self.derived(id)
            .is_some_and(|d| d.tree_visible && d.tree_interactive)
    }

    /// Eligible for rectangle testing.
    pub fn is_rect_testable(&mut self, id: ElementId) -> bool {
        self.is_hit_testable(id)
    }

    /// The element or an ancestor is a mask, and the element is tree visible.
    pub fn is_tree_in_mask(&mut self, id: ElementId) -> bool {
        self.derived(id).is_some_and(|d| d.in_mask)
    }

    /// The sibling masking this element, or [`ElementId::INVALID`].
    pub fn mask_id(&mut self, id: ElementId) -> ElementId {
        self.derived(id)
            .map_or(ElementId::INVALID, |d| d.mask_id)
    }

    /// Non-zero layer blurs from the root down to `id`.
    pub fn tree_layer_blurs(&self, id: ElementId) -> SmallVec<[f64; 4]> {
        let mut blurs = SmallVec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(n) = self.get(c) else {
                break;
            };
            if n.effects.layer_blur > 0.0 {
                blurs.push(n.effects.layer_blur);
            }
            cur = n.parent;
        }
        blurs.reverse();
        blurs
    }

    /// World-space bounds of what the element paints, including its own effects.
    pub fn world_render_bounds(&mut self, id: ElementId) -> Option<Rect> {
        self.derived(id)?.render_bounds
    }

    /// World-space bounds of the element's own hit-testable content.
    pub fn world_interact_bounds(&mut self, id: ElementId) -> Option<Rect> {
        self.derived(id)?.interact_bounds
    }

    /// Union of interact bounds over the rect-testable part of the subtree.
    pub fn world_tree_interact_bounds(&mut self, id: ElementId) -> Option<Rect> {
        self.derived(id)?.tree_interact_bounds
    }

    /// Sprite geometry plus visible descendants' content, in the element's local space.
    ///
    /// Returns `None` when nothing is drawn.
    pub fn simple_tree_content_path(&mut self, id: ElementId) -> Option<BezPath> {
        self.refresh();
        self.content_path(id)
    }

    fn content_path(&self, id: ElementId) -> Option<BezPath> {
        let n = self.get(id)?;
        let mut path = BezPath::new();
        if let Some(sprite) = &n.sprite {
            for part in [sprite.fill_path(n.size), sprite.stroke_path(n.size)]
                .into_iter()
                .flatten()
            {
                union_paths(&mut path, &part);
            }
        }
        for &c in &n.children {
            let Some(cn) = self.get(c) else {
                continue;
            };
            if !cn.is_visible() {
                continue;
            }
            if let Some(mut child) = self.content_path(c) {
                child.apply_affine(cn.transform);
                union_paths(&mut path, &child);
            }
        }
        path_bounds(&path).map(|_| path)
    }

    /// Drop shadows that apply, with spread zeroed when spread is disabled.
    ///
    /// Empty for elements that are not tree visible.
    pub fn self_drop_shadows(&mut self, id: ElementId) -> Vec<DropShadow> {
        if !self.is_tree_visible(id) {
            return Vec::new();
        }
        let Some(n) = self.get(id) else {
            return Vec::new();
        };
        n.effects
            .drop_shadows
            .iter()
            .map(|s| DropShadow {
                spread: effective_spread(&n.effects, s.spread),
                ..*s
            })
            .collect()
    }

    /// Inner shadows that apply, with spread zeroed when spread is disabled.
    pub fn self_inner_shadows(&mut self, id: ElementId) -> Vec<InnerShadow> {
        if !self.is_tree_visible(id) {
            return Vec::new();
        }
        let Some(n) = self.get(id) else {
            return Vec::new();
        };
        n.effects
            .inner_shadows
            .iter()
            .map(|s| InnerShadow {
                spread: effective_spread(&n.effects, s.spread),
                ..*s
            })
            .collect()
    }

    /// Background blur that applies, 0 for elements that are not tree visible.
    pub fn self_background_blur(&mut self, id: ElementId) -> f64 {
        if !self.is_tree_visible(id) {
            return 0.0;
        }
        self.get(id).map_or(0.0, |n| n.effects.background_blur)
    }

    /// One outline per drop shadow: the content dilated by the shadow's spread.
    ///
    /// `None` without a sprite or when the sprite has no fill.
    pub fn simple_self_drop_shadow_paths(&mut self, id: ElementId) -> Option<Vec<BezPath>> {
        let shadows = self.self_drop_shadows(id);
        let n = self.get(id)?;
        let sprite = n.sprite.as_ref()?;
        let mut content = sprite.fill_path(n.size)?;
        if let Some(stroke) = sprite.stroke_path(n.size) {
            union_paths(&mut content, &stroke);
        }
        let bounds = path_bounds(&content)?;
        Some(
            shadows
                .iter()
                .map(|s| {
                    if nearly_equal(s.spread, 0.0) {
                        content.clone()
                    } else {
                        bounds.inflate(s.spread, s.spread).to_path(0.1)
                    }
                })
                .collect(),
        )
    }

    /// One outline per inner shadow: the fill inset by the shadow's spread.
    ///
    /// `None` without a sprite, without a fill, or when the sprite has any stroke.
    pub fn simple_self_inner_shadow_paths(&mut self, id: ElementId) -> Option<Vec<BezPath>> {
        let shadows = self.self_inner_shadows(id);
        let n = self.get(id)?;
        let sprite = n.sprite.as_ref()?;
        if sprite.stroke_path(n.size).is_some() {
            return None;
        }
        let fill = sprite.fill_path(n.size)?;
        let bounds = path_bounds(&fill)?;
        Some(
            shadows
                .iter()
                .map(|s| {
                    if nearly_equal(s.spread, 0.0) {
                        fill.clone()
                    } else {
                        let inset = s
                            .spread
                            .min(bounds.width() * 0.5)
                            .min(bounds.height() * 0.5);
                        bounds.inflate(-inset, -inset).to_path(0.1)
                    }
                })
                .collect(),
        )
    }
}
