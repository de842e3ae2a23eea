// One simulation tick over the tree's leaves.

use std::collections::HashSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::collision::{handle_border_collisions, solve_collision, test_collision, Border, CollisionInfo};
use crate::collection::Arena;
use crate::common::Settings;
use crate::integration::integrator::integrate_once;
use crate::spatial::quadtree::{Entry, NodeRegion, QuadTree};

/// A colliding pair found in one leaf, as indices into the object arena.
type LeafHit = (usize, usize, CollisionInfo);

impl QuadTree {
    /// Advances every object by `dt`.
    ///
    /// Bodies are integrated once each, colliding pairs are found leaf by leaf
    /// and resolved in leaf order, bodies are kept inside the border and finally
    /// re-indexed if they left their leaf. Queued insertions and removals are
    /// not applied here. Returns the number of resolved pairs.
    pub fn update(&mut self, settings: &Settings, dt: f32) -> usize {
        self.tick += 1;
        let tick = self.tick;

        let leaves: Vec<(NodeRegion, Vec<usize>)> = self
            .leaf_regions()
            .into_iter()
            .map(|region| (region, self.leaf_objects(region.node)))
            .collect();

        // --- Integration --- //
        for (_, members) in &leaves {
            for &index in members {
                integrate_once(&mut self.objects[index].object, settings, dt, tick);
            }
        }

        // --- Narrow phase, read-only --- //
        let hits = find_hits(&self.objects, &leaves);

        // --- Resolution, sequential in leaf order --- //
        let mut seen = HashSet::new();
        let mut resolved = 0;
        for (a, b, info) in hits.into_iter().flatten() {
            if !seen.insert((a.min(b), a.max(b))) {
                continue;
            }
            let (entry_a, entry_b) = self.objects.pair_mut(a, b);
            solve_collision(&mut entry_a.object, &mut entry_b.object, &info);
            resolved += 1;
        }

        // --- Border --- //
        let border = Border::new(self.bounds);
        for (_, entry) in self.objects.iter_mut() {
            handle_border_collisions(&mut entry.object, &border, settings);
        }

        // --- Relocation --- //
        let moved = self.relocate(&leaves, &border);
        self.cleanup();

        debug!(tick, objects = self.objects.len(), leaves = leaves.len(), resolved, moved, "tick");
        resolved
    }

    /// Re-indexes every object whose box changed during the tick, so the
    /// indexed box always matches the object's current box between ticks.
    /// Returns the number of relocated objects.
    fn relocate(&mut self, leaves: &[(NodeRegion, Vec<usize>)], border: &Border) -> usize {
        let mut pending = Vec::new();
        let mut queued = HashSet::new();
        for (_, members) in leaves {
            for &index in members {
                let entry = &self.objects[index];
                if entry.object.bounding_box() != entry.indexed_bounds && queued.insert(index) {
                    pending.push(index);
                }
            }
        }

        for &index in &pending {
            self.unindex_object(index);
            let object = &mut self.objects[index].object;
            border.move_inside_border(object);
            let bounds = object.bounding_box();
            self.index_object(index, bounds);
        }
        pending.len()
    }
}

fn detect_in_leaf(objects: &Arena<Entry>, members: &[usize]) -> Vec<LeafHit> {
    let mut hits = Vec::new();
    for (i, &a) in members.iter().enumerate() {
        for &b in &members[i + 1..] {
            let (object_a, object_b) = (&objects[a].object, &objects[b].object);
            if object_a.is_static() && object_b.is_static() {
                continue;
            }
            let info = test_collision(object_a, object_b);
            if info.has_collision() {
                hits.push((a, b, info));
            }
        }
    }
    hits
}

#[cfg(feature = "parallel")]
fn find_hits(objects: &Arena<Entry>, leaves: &[(NodeRegion, Vec<usize>)]) -> Vec<Vec<LeafHit>> {
    leaves
        .par_iter()
        .map(|(_, members)| detect_in_leaf(objects, members))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn find_hits(objects: &Arena<Entry>, leaves: &[(NodeRegion, Vec<usize>)]) -> Vec<Vec<LeafHit>> {
    leaves
        .iter()
        .map(|(_, members)| detect_in_leaf(objects, members))
        .collect()
}
