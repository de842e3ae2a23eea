// Region quadtree over arena storage, used as the broad phase.

use std::collections::HashMap;
use std::mem;

use tracing::{debug, trace, warn};

use crate::collection::Arena;
use crate::math::{BoundingBox, Vec2};
use crate::objects::{ObjectId, PhysicsObject};

/// Index of the root node. It is never freed.
pub const ROOT: usize = 0;

/// `count` value marking a branch.
const BRANCH: i32 = -1;

/// A tree node. Leaves chain their elements from `first`; branches point at
/// the first of four contiguous children (top-left, top-right, bottom-left,
/// bottom-right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct QuadNode {
    pub first: Option<usize>,
    pub count: i32,
}

impl QuadNode {
    fn leaf() -> Self {
        QuadNode { first: None, count: 0 }
    }

    #[inline]
    pub fn is_branch(&self) -> bool {
        self.count == BRANCH
    }
}

/// One entry of a leaf's element list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct NodeElement {
    pub object_index: usize,
    pub next: Option<usize>,
}

/// A node together with the bounds and depth derived while descending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRegion {
    pub node: usize,
    pub bounds: BoundingBox,
    pub depth: usize,
}

impl NodeRegion {
    /// Regions of the four children of a branch whose first child is `first`.
    fn children(&self, first: usize) -> [NodeRegion; 4] {
        let quadrants = self.bounds.quadrants();
        std::array::from_fn(|k| NodeRegion {
            node: first + k,
            bounds: quadrants[k],
            depth: self.depth + 1,
        })
    }
}

/// Debug view of a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafInfo {
    pub bounds: BoundingBox,
    pub count: usize,
    pub depth: usize,
}

/// A stored object and the bounding box it was last indexed with.
#[derive(Debug)]
pub(super) struct Entry {
    pub object: PhysicsObject,
    pub indexed_bounds: BoundingBox,
}

/// Owns every body in the world and indexes them by position.
///
/// Insertions and removals are queued and only applied by
/// [`QuadTree::process_pending_operations`], so the structure never changes
/// while a tick is running.
#[derive(Debug)]
pub struct QuadTree {
    pub(super) bounds: BoundingBox,
    pub(super) capacity: usize,
    pub(super) min_node_size: f32,
    pub(super) nodes: Arena<QuadNode>,
    pub(super) elements: Arena<NodeElement>,
    pub(super) objects: Arena<Entry>,
    pub(super) ids: HashMap<ObjectId, usize>,
    pending_insert: Vec<PhysicsObject>,
    pending_remove: Vec<ObjectId>,
    rebuild_requested: bool,
    pub(super) tick: u64,
}

impl QuadTree {
    /// Creates an empty tree.
    ///
    /// # Arguments
    /// * `bounds` - The world area covered by the root.
    /// * `capacity` - Elements a leaf holds before it splits. Raised to 1 if zero.
    /// * `min_node_size` - Leaves whose smaller side is at or below this never split.
    pub fn new(bounds: BoundingBox, capacity: usize, min_node_size: f32) -> Self {
        let mut nodes = Arena::new();
        nodes.add(QuadNode::leaf());
        QuadTree {
            bounds,
            capacity: capacity.max(1),
            min_node_size,
            nodes,
            elements: Arena::new(),
            objects: Arena::new(),
            ids: HashMap::new(),
            pending_insert: Vec::new(),
            pending_remove: Vec::new(),
            rebuild_requested: false,
            tick: 0,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the leaf capacity. The tree is rebuilt on the next
    /// [`QuadTree::process_pending_operations`].
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.rebuild_requested = true;
    }

    pub fn min_node_size(&self) -> f32 {
        self.min_node_size
    }

    pub fn set_min_node_size(&mut self, min_node_size: f32) {
        self.min_node_size = min_node_size;
        self.rebuild_requested = true;
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // --- Command queue ---

    /// Queues `object` for insertion and returns its id.
    pub fn insert(&mut self, object: PhysicsObject) -> ObjectId {
        let id = object.id();
        self.pending_insert.push(object);
        id
    }

    /// Queues the object with `id` for removal.
    pub fn remove(&mut self, id: ObjectId) {
        self.pending_remove.push(id);
    }

    /// Asks for a full rebuild on the next [`QuadTree::process_pending_operations`].
    pub fn rebuild(&mut self) {
        self.rebuild_requested = true;
    }

    pub fn has_pending_operations(&self) -> bool {
        self.rebuild_requested || !self.pending_insert.is_empty() || !self.pending_remove.is_empty()
    }

    /// Applies queued work: rebuild if requested, then insertions, then
    /// removals, then collapses of underfull branches.
    pub fn process_pending_operations(&mut self) {
        if self.rebuild_requested {
            self.rebuild_now();
        }
        for object in mem::take(&mut self.pending_insert) {
            self.insert_now(object);
        }
        for id in mem::take(&mut self.pending_remove) {
            self.remove_now(id);
        }
        self.cleanup();
    }

    /// Drops every object, queued operation and node.
    pub fn clear(&mut self) {
        self.pending_insert.clear();
        self.pending_remove.clear();
        self.rebuild_requested = false;
        self.objects.clear();
        self.ids.clear();
        self.reset_nodes();
    }

    // --- Queries ---

    /// Returns the object whose shape contains `point`, if any.
    pub fn query(&self, point: Vec2) -> Option<&PhysicsObject> {
        if !self.bounds.contains_point(point) {
            return None;
        }

        let mut region = self.root_region();
        while self.nodes[region.node].is_branch() {
            let center = region.bounds.center();
            let top = point.y >= center.y;
            let left = point.x <= center.x;
            let quadrant = match (top, left) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            };
            let first = self.first_child(region.node);
            region = region.children(first)[quadrant];
        }

        self.leaf_objects(region.node)
            .into_iter()
            .map(|index| &self.objects[index].object)
            .find(|object| object.contains(point))
    }

    pub fn get(&self, id: ObjectId) -> Option<&PhysicsObject> {
        let index = *self.ids.get(&id)?;
        Some(&self.objects[index].object)
    }

    /// Mutable access to a stored object. Moving it is picked up by the next tick's
    /// relocation pass once its bounding box is updated.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PhysicsObject> {
        let index = *self.ids.get(&id)?;
        Some(&mut self.objects[index].object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains_key(&id)
    }

    /// Iterates over every stored object in storage order.
    pub fn objects(&self) -> impl Iterator<Item = &PhysicsObject> {
        self.objects.values().map(|entry| &entry.object)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Debug view of every leaf in breadth-first order.
    pub fn leaves(&self) -> Vec<LeafInfo> {
        self.leaf_regions()
            .into_iter()
            .map(|region| LeafInfo {
                bounds: region.bounds,
                count: self.nodes[region.node].count.max(0) as usize,
                depth: region.depth,
            })
            .collect()
    }

    /// Depth of the deepest leaf. A tree that never split has depth 0.
    pub fn depth(&self) -> usize {
        self.leaf_regions().iter().map(|r| r.depth).max().unwrap_or(0)
    }

    // --- Helper Methods ---

    #[inline]
    pub(super) fn root_region(&self) -> NodeRegion {
        NodeRegion {
            node: ROOT,
            bounds: self.bounds,
            depth: 0,
        }
    }

    #[inline]
    fn first_child(&self, node: usize) -> usize {
        // A branch always has children
        self.nodes[node].first.unwrap_or(ROOT)
    }

    /// Every leaf in breadth-first order.
    pub(super) fn leaf_regions(&self) -> Vec<NodeRegion> {
        let mut leaves = Vec::new();
        let mut queue = std::collections::VecDeque::from([self.root_region()]);
        while let Some(region) = queue.pop_front() {
            if self.nodes[region.node].is_branch() {
                queue.extend(region.children(self.first_child(region.node)));
            } else {
                leaves.push(region);
            }
        }
        leaves
    }

    /// Leaves whose region overlaps `bounds`.
    fn find_leaves(&self, bounds: &BoundingBox) -> Vec<NodeRegion> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root_region()];
        while let Some(region) = stack.pop() {
            if !region.bounds.overlaps(bounds) {
                continue;
            }
            if self.nodes[region.node].is_branch() {
                stack.extend(region.children(self.first_child(region.node)));
            } else {
                leaves.push(region);
            }
        }
        leaves
    }

    /// Object indices stored in a leaf, in list order.
    pub(super) fn leaf_objects(&self, node: usize) -> Vec<usize> {
        let mut objects = Vec::with_capacity(self.nodes[node].count.max(0) as usize);
        let mut cursor = self.nodes[node].first;
        while let Some(element) = cursor {
            objects.push(self.elements[element].object_index);
            cursor = self.elements[element].next;
        }
        objects
    }

    fn reset_nodes(&mut self) {
        self.nodes.clear();
        self.elements.clear();
        self.nodes.add(QuadNode::leaf());
    }

    // --- Insertion ---

    fn insert_now(&mut self, object: PhysicsObject) {
        let id = object.id();
        if self.ids.contains_key(&id) {
            warn!(%id, "object is already in the tree, insert skipped");
            return;
        }
        let bounds = object.bounding_box();
        if !self.bounds.overlaps(&bounds) {
            warn!(%id, ?bounds, "object lies outside the world, insert skipped");
            return;
        }

        let index = self.objects.add(Entry {
            object,
            indexed_bounds: bounds,
        });
        self.ids.insert(id, index);
        self.index_object(index, bounds);
    }

    /// Adds the object to every leaf overlapping `bounds` and records the box.
    pub(super) fn index_object(&mut self, object_index: usize, bounds: BoundingBox) {
        self.objects[object_index].indexed_bounds = bounds;
        for region in self.find_leaves(&bounds) {
            self.add_to_leaf(region, object_index);
        }
    }

    fn add_to_leaf(&mut self, region: NodeRegion, object_index: usize) {
        if !self.push_element(region.node, object_index) {
            return;
        }
        if self.should_split(&region) {
            self.split(region);
        }
    }

    /// Links a new element at the head of the leaf's list. Returns false if
    /// the object was already there.
    fn push_element(&mut self, node: usize, object_index: usize) -> bool {
        if self.leaf_objects(node).contains(&object_index) {
            return false;
        }
        let element = self.elements.add(NodeElement {
            object_index,
            next: self.nodes[node].first,
        });
        let leaf = &mut self.nodes[node];
        leaf.first = Some(element);
        leaf.count += 1;
        true
    }

    fn should_split(&self, region: &NodeRegion) -> bool {
        let node = self.nodes[region.node];
        !node.is_branch()
            && node.count as usize > self.capacity
            && region.bounds.width.min(region.bounds.height) > self.min_node_size
    }

    /// Turns a full leaf into a branch and spreads its elements over the
    /// children they overlap.
    fn split(&mut self, region: NodeRegion) {
        let objects = self.take_elements(region.node);

        let first = self.nodes.add(QuadNode::leaf());
        for k in 1..4 {
            let child = self.nodes.add(QuadNode::leaf());
            debug_assert_eq!(child, first + k, "quadtree children must be contiguous");
        }
        self.nodes[region.node] = QuadNode {
            first: Some(first),
            count: BRANCH,
        };

        let children = region.children(first);
        for &object_index in &objects {
            let bounds = self.objects[object_index].indexed_bounds;
            for child in &children {
                if child.bounds.overlaps(&bounds) {
                    self.push_element(child.node, object_index);
                }
            }
        }
        trace!(node = region.node, depth = region.depth, objects = objects.len(), "split leaf");

        for child in children {
            if self.should_split(&child) {
                self.split(child);
            }
        }
    }

    /// Unlinks and frees every element of a leaf, returning the object indices.
    fn take_elements(&mut self, node: usize) -> Vec<usize> {
        let mut objects = Vec::new();
        let mut cursor = self.nodes[node].first;
        while let Some(element) = cursor {
            let removed = self.elements.free(element);
            objects.push(removed.object_index);
            cursor = removed.next;
        }
        self.nodes[node] = QuadNode::leaf();
        objects
    }

    // --- Removal ---

    fn remove_now(&mut self, id: ObjectId) {
        let Some(index) = self.ids.remove(&id) else {
            warn!(%id, "object is not in the tree, remove skipped");
            return;
        };
        self.unindex_object(index);
        self.objects.free(index);
    }

    /// Removes the object from every leaf its indexed box overlaps.
    pub(super) fn unindex_object(&mut self, object_index: usize) {
        let bounds = self.objects[object_index].indexed_bounds;
        for region in self.find_leaves(&bounds) {
            if !self.unlink_element(region.node, object_index) {
                debug!(node = region.node, object_index, "indexed leaf did not hold the object");
            }
        }
    }

    fn unlink_element(&mut self, node: usize, object_index: usize) -> bool {
        let mut previous: Option<usize> = None;
        let mut cursor = self.nodes[node].first;
        while let Some(element) = cursor {
            let NodeElement { object_index: current, next } = self.elements[element];
            if current == object_index {
                match previous {
                    Some(p) => self.elements[p].next = next,
                    None => self.nodes[node].first = next,
                }
                self.elements.free(element);
                self.nodes[node].count -= 1;
                return true;
            }
            previous = Some(element);
            cursor = next;
        }
        false
    }

    // --- Maintenance ---

    /// Collapses branches whose four children are leaves holding at most
    /// `capacity` elements together. Runs bottom-up so collapses cascade.
    pub fn cleanup(&mut self) {
        self.collapse(ROOT);
    }

    fn collapse(&mut self, node: usize) {
        if !self.nodes[node].is_branch() {
            return;
        }
        let first = self.first_child(node);
        for k in 0..4 {
            self.collapse(first + k);
        }

        let children: [QuadNode; 4] = std::array::from_fn(|k| self.nodes[first + k]);
        if children.iter().any(QuadNode::is_branch) {
            return;
        }
        let total: i32 = children.iter().map(|c| c.count).sum();
        if total as usize > self.capacity {
            return;
        }

        let mut merged: Vec<usize> = Vec::with_capacity(total as usize);
        for k in 0..4 {
            for object_index in self.take_elements(first + k) {
                if !merged.contains(&object_index) {
                    merged.push(object_index);
                }
            }
        }
        // Reverse order keeps the block contiguous on the free list
        for k in (0..4).rev() {
            self.nodes.free(first + k);
        }
        self.nodes[node] = QuadNode::leaf();
        for object_index in merged.iter().rev() {
            self.push_element(node, *object_index);
        }
        trace!(node, objects = merged.len(), "collapsed branch");
    }

    fn rebuild_now(&mut self) {
        self.rebuild_requested = false;
        let mut entries = Vec::with_capacity(self.objects.len());
        let indices: Vec<usize> = self.objects.iter().map(|(index, _)| index).collect();
        for index in indices {
            entries.push(self.objects.free(index));
        }
        self.objects.clear();
        self.ids.clear();
        self.reset_nodes();

        debug!(objects = entries.len(), capacity = self.capacity, "rebuilding quadtree");
        for entry in entries {
            self.insert_now(entry.object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectFactory;
    use std::collections::HashSet;

    fn tree(capacity: usize) -> QuadTree {
        QuadTree::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), capacity, 2.0)
    }

    fn ball(x: f32, y: f32, radius: f32) -> PhysicsObject {
        ObjectFactory::default().circle(Vec2::new(x, y), radius).unwrap()
    }

    /// Inserts the diagonal of circles that splits the bottom-left quadrant.
    fn diagonal_tree() -> (QuadTree, Vec<ObjectId>) {
        let mut tree = tree(4);
        let ids = [5.0, 15.0, 25.0, 35.0, 45.0]
            .iter()
            .map(|&p| tree.insert(ball(p, p, 1.0)))
            .collect();
        tree.process_pending_operations();
        (tree, ids)
    }

    #[test]
    fn test_empty_tree_query_returns_none() {
        let tree = tree(4);
        assert!(tree.query(Vec2::new(50.0, 50.0)).is_none());
        assert_eq!(tree.object_count(), 0);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_insert_is_deferred_until_processed() {
        let mut tree = tree(4);
        let id = tree.insert(ball(50.0, 50.0, 2.0));
        assert!(tree.has_pending_operations());
        assert!(tree.query(Vec2::new(50.0, 50.0)).is_none());

        tree.process_pending_operations();
        assert!(!tree.has_pending_operations());
        assert_eq!(tree.query(Vec2::new(50.0, 50.0)).map(|o| o.id()), Some(id));
        assert_eq!(tree.query(Vec2::new(51.0, 51.0)).map(|o| o.id()), Some(id));
        assert!(tree.query(Vec2::new(53.0, 53.0)).is_none());
    }

    #[test]
    fn test_remove_object() {
        let mut tree = tree(4);
        let id = tree.insert(ball(10.0, 10.0, 2.0));
        tree.process_pending_operations();
        tree.remove(id);
        tree.process_pending_operations();
        assert!(tree.query(Vec2::new(10.0, 10.0)).is_none());
        assert!(!tree.contains(id));
        assert_eq!(tree.object_count(), 0);
        assert_eq!(tree.nodes[ROOT].count, 0);
    }

    #[test]
    fn test_unknown_remove_is_skipped() {
        let mut tree = tree(4);
        let id = tree.insert(ball(10.0, 10.0, 2.0));
        tree.process_pending_operations();

        let stranger = ball(20.0, 20.0, 1.0).id();
        tree.remove(stranger);
        tree.remove(id);
        tree.remove(id);
        tree.process_pending_operations();
        assert_eq!(tree.object_count(), 0);
        assert!(!tree.contains(id));
    }

    #[test]
    fn test_object_outside_world_is_skipped() {
        let mut tree = tree(4);
        let id = tree.insert(ball(500.0, 500.0, 1.0));
        tree.process_pending_operations();
        assert!(!tree.contains(id));
        assert_eq!(tree.object_count(), 0);
    }

    #[test]
    fn test_split_keeps_every_object() {
        let (tree, ids) = diagonal_tree();
        assert_eq!(tree.object_count(), 5);

        assert!(tree.nodes[ROOT].is_branch());
        let root_first = tree.nodes[ROOT].first.unwrap();
        let bottom_left = root_first + 2;
        assert!(tree.nodes[bottom_left].is_branch());

        let first = tree.nodes[bottom_left].first.unwrap();
        let counts: Vec<i32> = (0..4).map(|k| tree.nodes[first + k].count).collect();
        assert_eq!(counts, vec![1, 3, 3, 1]);
        assert_eq!(tree.depth(), 2);

        for (id, p) in ids.iter().zip([5.0, 15.0, 25.0, 35.0, 45.0]) {
            assert_eq!(tree.query(Vec2::new(p, p)).map(|o| o.id()), Some(*id));
        }
    }

    #[test]
    fn test_one_over_capacity_splits_once() {
        let mut tree = tree(4);
        let ids: Vec<ObjectId> = [(20.0, 80.0), (30.0, 70.0), (80.0, 80.0), (20.0, 20.0), (80.0, 20.0)]
            .iter()
            .map(|&(x, y)| tree.insert(ball(x, y, 1.0)))
            .collect();
        tree.process_pending_operations();

        assert!(tree.nodes[ROOT].is_branch());
        let first = tree.nodes[ROOT].first.unwrap();
        let counts: Vec<i32> = (0..4).map(|k| tree.nodes[first + k].count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
        assert_eq!(tree.nodes.len(), 5);
        assert_eq!(tree.depth(), 1);

        let stored: HashSet<ObjectId> = (0..4)
            .flat_map(|k| tree.leaf_objects(first + k))
            .map(|index| tree.objects[index].object.id())
            .collect();
        assert_eq!(stored.len(), 5);
        assert!(ids.iter().all(|id| stored.contains(id)));
    }

    #[test]
    fn test_leaves_report_bounds_and_counts() {
        let (tree, _) = diagonal_tree();
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 7);
        let deep: Vec<&LeafInfo> = leaves.iter().filter(|l| l.depth == 2).collect();
        assert_eq!(deep.len(), 4);
        assert!(deep
            .iter()
            .any(|l| l.bounds == BoundingBox::new(25.0, 25.0, 25.0, 25.0) && l.count == 3));
    }

    #[test]
    fn test_removals_collapse_branches() {
        let (mut tree, ids) = diagonal_tree();
        // The circle on the shared center counts once per child, so it must go too
        tree.remove(ids[0]);
        tree.remove(ids[2]);
        tree.remove(ids[4]);
        tree.process_pending_operations();

        assert_eq!(tree.object_count(), 2);
        assert!(!tree.nodes[ROOT].is_branch());
        assert_eq!(tree.nodes[ROOT].count, 2);
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_children_stay_contiguous_after_reuse() {
        let (mut tree, ids) = diagonal_tree();
        for id in &ids {
            tree.remove(*id);
        }
        tree.process_pending_operations();
        assert_eq!(tree.nodes.len(), 1);

        for p in [5.0, 15.0, 25.0, 35.0, 45.0] {
            tree.insert(ball(p, p, 1.0));
        }
        tree.process_pending_operations();
        let first = tree.nodes[ROOT].first.unwrap();
        let inner = tree.nodes[first + 2].first.unwrap();
        let counts: Vec<i32> = (0..4).map(|k| tree.nodes[inner + k].count).collect();
        assert_eq!(counts, vec![1, 3, 3, 1]);
    }

    #[test]
    fn test_same_position_objects_stop_at_min_node_size() {
        let mut tree = tree(1);
        for _ in 0..3 {
            tree.insert(ball(50.0, 50.0, 0.1));
        }
        tree.process_pending_operations();
        assert_eq!(tree.object_count(), 3);
        assert!(tree.leaves().iter().all(|l| l.bounds.width > 1.0));
        assert!(tree.query(Vec2::new(50.0, 50.0)).is_some());
    }

    #[test]
    fn test_query_ties_go_left_and_up() {
        let (tree, _) = diagonal_tree();
        // (25, 25) is the center of the bottom-left quadrant, shared by all four of its children
        assert!(tree.query(Vec2::new(25.0, 25.0)).is_some());
        assert!(tree.query(Vec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_set_capacity_rebuilds() {
        let (mut tree, ids) = diagonal_tree();
        tree.set_capacity(0);
        assert_eq!(tree.capacity(), 1);
        tree.set_capacity(10);
        tree.process_pending_operations();
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(tree.object_count(), 5);
        for id in ids {
            assert!(tree.contains(id));
        }
    }

    #[test]
    fn test_clear_drops_everything() {
        let (mut tree, _) = diagonal_tree();
        tree.insert(ball(70.0, 70.0, 1.0));
        tree.clear();
        tree.process_pending_operations();
        assert_eq!(tree.object_count(), 0);
        assert_eq!(tree.leaves().len(), 1);
    }
}
