// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial queries over interact bounds.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::tree::ElementTree;
use crate::types::ElementId;
use crate::util::{rect_contains, rects_overlap};

impl ElementTree {
    /// Visit the shallowest descendants of `id` whose own interact bounds overlap `rect`.
    ///
    /// Subtrees that are not rect testable, or whose tree interact bounds miss `rect`, are skipped.
    /// A visited element is not descended into. Overlap is strict: touching edges do not count.
    pub fn for_each_intersected_subtree(
        &mut self,
        id: ElementId,
        rect: Rect,
        mut visit: impl FnMut(ElementId),
    ) {
        self.refresh();
        let Some(n) = self.get(id) else {
            return;
        };
        let mut stack: Vec<ElementId> = n.children.iter().rev().copied().collect();
        while let Some(cur) = stack.pop() {
            let Some(n) = self.get(cur) else {
                continue;
            };
            let d = &n.derived;
            if !(d.tree_visible && d.tree_interactive) {
                continue;
            }
            if !d.tree_interact_bounds.is_some_and(|b| rects_overlap(b, rect)) {
                continue;
            }
            if d.interact_bounds.is_some_and(|b| rects_overlap(b, rect)) {
                visit(cur);
                continue;
            }
            stack.extend(n.children.iter().rev().copied());
        }
    }

    /// Collect [`ElementTree::for_each_intersected_subtree`] results in visit order.
    pub fn intersected_subtrees(&mut self, id: ElementId, rect: Rect) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.for_each_intersected_subtree(id, rect, |e| out.push(e));
        out
    }

    /// Whether `rect` contains the union of the subtree's interact bounds.
    ///
    /// An element with nothing interactive in its subtree is never covered.
    pub fn is_subtree_full_covered(&mut self, id: ElementId, rect: Rect) -> bool {
        self.world_tree_interact_bounds(id)
            .is_some_and(|b| rect_contains(rect, b))
    }

    /// Topmost hit-testable element under `point` in the subtree at `id`, in paint order.
    pub fn hit_test(&mut self, id: ElementId, point: Point) -> Option<ElementId> {
        self.refresh();
        let mut best = None;
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(n) = self.get(cur) else {
                continue;
            };
            let d = &n.derived;
            if !(d.tree_visible && d.tree_interactive) {
                continue;
            }
            if !d.tree_interact_bounds.is_some_and(|b| b.contains(point)) {
                continue;
            }
            if d.interact_bounds.is_some_and(|b| b.contains(point)) {
                best = Some(cur);
            }
            // Later children paint on top, so they are visited last and win.
            stack.extend(self.paint_order(cur).into_iter().rev());
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::ShapeSprite;
    use alloc::rc::Rc;
    use kurbo::Affine;

    /// root -> e1 -> e2 -> e3, each a 10x10 sprite offset by (10, 10) from its parent.
    fn chain() -> (ElementTree, [ElementId; 3]) {
        let mut tree = ElementTree::new();
        let ids = [tree.create(), tree.create(), tree.create()];
        for &e in &ids {
            tree.set_sprite(e, Some(Rc::new(ShapeSprite::rect(10.0, 10.0))));
            tree.set_relative_transform(e, Affine::translate((10.0, 10.0)));
        }
        tree.append_child(tree.root(), ids[0]).unwrap();
        tree.append_child(ids[0], ids[1]).unwrap();
        tree.append_child(ids[1], ids[2]).unwrap();
        let _ = tree.flush();
        (tree, ids)
    }

    #[test]
    fn intersected_subtrees_stop_at_first_hit() {
        let (mut tree, [e1, _, _]) = chain();
        let root = tree.root();
        assert!(
            tree.intersected_subtrees(root, Rect::new(0.0, 0.0, 10.0, 10.0))
                .is_empty(),
            "touching edges do not intersect"
        );
        assert_eq!(
            tree.intersected_subtrees(root, Rect::new(5.0, 5.0, 15.0, 15.0)),
            vec![e1]
        );
        assert_eq!(
            tree.intersected_subtrees(root, Rect::new(15.0, 15.0, 25.0, 25.0)),
            vec![e1],
            "descendants of a selected element are not visited"
        );
    }

    #[test]
    fn intersected_subtrees_descend_past_misses() {
        let (mut tree, [e1, e2, _]) = chain();
        let root = tree.root();
        assert_eq!(
            tree.intersected_subtrees(root, Rect::new(22.0, 22.0, 28.0, 28.0)),
            vec![e2]
        );
        tree.set_interactive(e1, false);
        assert!(
            tree.intersected_subtrees(root, Rect::new(22.0, 22.0, 28.0, 28.0))
                .is_empty(),
            "non-interactive subtrees are skipped"
        );
    }

    #[test]
    fn full_cover_requires_containing_the_subtree() {
        let (mut tree, [e1, _, _]) = chain();
        assert!(tree.is_subtree_full_covered(e1, Rect::new(10.0, 10.0, 40.0, 40.0)));
        assert!(!tree.is_subtree_full_covered(e1, Rect::new(9.0, 9.0, 39.0, 39.0)));
        assert!(!tree.is_subtree_full_covered(e1, Rect::new(10.0, 10.0, 39.0, 39.0)));
    }

    #[test]
    fn hit_test_prefers_deepest_topmost() {
        let (mut tree, [e1, e2, e3]) = chain();
        let root = tree.root();
        assert_eq!(tree.hit_test(root, Point::new(35.0, 35.0)), Some(e3));
        assert_eq!(tree.hit_test(root, Point::new(15.0, 15.0)), Some(e1));
        tree.set_visible(e3, false);
        assert_eq!(tree.hit_test(root, Point::new(25.0, 25.0)), Some(e2));
        assert_eq!(tree.hit_test(root, Point::new(35.0, 35.0)), None);
    }
}
