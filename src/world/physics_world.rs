use tracing::debug;

use crate::collision::Border;
use crate::common::error::{PhysicsError, Result};
use crate::common::Settings;
use crate::math::{BoundingBox, Vec2};
use crate::objects::{ObjectFactory, ObjectId, PhysicsObject};
use crate::spatial::{LeafInfo, QuadTree};

/// The simulation context: settings, the border and the tree that owns every body.
#[derive(Debug)]
pub struct PhysicsWorld {
    settings: Settings,
    border: Border,
    tree: QuadTree,
    /// Simulated seconds, after time scaling.
    elapsed: f64,
}

impl PhysicsWorld {
    /// Creates an empty world covering `bounds`.
    pub fn new(bounds: BoundingBox, settings: Settings) -> Result<Self> {
        settings.validate()?;
        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            return Err(PhysicsError::InvalidConfig {
                field: "bounds",
                reason: format!("world must have a positive size, got {}x{}", bounds.width, bounds.height),
            });
        }
        let tree = QuadTree::new(bounds, settings.capacity, settings.min_node_size);
        Ok(Self {
            settings,
            border: Border::new(bounds),
            tree,
            elapsed: 0.0,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings. A changed capacity or minimum node size
    /// rebuilds the tree before the next step.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        if settings.capacity != self.settings.capacity {
            self.tree.set_capacity(settings.capacity);
        }
        if settings.min_node_size != self.settings.min_node_size {
            self.tree.set_min_node_size(settings.min_node_size);
        }
        self.settings = settings;
        Ok(())
    }

    pub fn bounds(&self) -> BoundingBox {
        self.border.bounds
    }

    pub fn border(&self) -> &Border {
        &self.border
    }

    /// Factory handing out bodies with the configured default material.
    pub fn factory(&self) -> ObjectFactory {
        ObjectFactory::new(self.settings.default_material)
    }

    /// Queues a body for insertion. It becomes visible after the next
    /// [`PhysicsWorld::flush`] or [`PhysicsWorld::step`].
    pub fn spawn(&mut self, object: PhysicsObject) -> ObjectId {
        self.tree.insert(object)
    }

    /// Queues a body for removal.
    pub fn despawn(&mut self, id: ObjectId) {
        self.tree.remove(id);
    }

    /// Applies queued spawns, despawns and rebuilds.
    pub fn flush(&mut self) {
        self.tree.process_pending_operations();
    }

    /// Drops every body.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Rebuilds the tree from scratch on the next flush.
    pub fn rebuild(&mut self) {
        self.tree.rebuild();
    }

    /// Advances the simulation by `dt` seconds, scaled by the time scale and
    /// split into the configured number of sub-steps. Returns the number of
    /// colliding pairs resolved.
    pub fn step(&mut self, dt: f32) -> usize {
        self.flush();

        let scaled = dt * self.settings.time_scale;
        if !(scaled > 0.0) {
            return 0;
        }
        let sub_steps = self.settings.sub_steps.max(1);
        let sub_dt = scaled / sub_steps as f32;

        let mut resolved = 0;
        for _ in 0..sub_steps {
            resolved += self.tree.update(&self.settings, sub_dt);
        }
        self.elapsed += f64::from(scaled);
        debug!(dt = scaled, sub_steps, resolved, "world step");
        resolved
    }

    /// The body whose shape contains `point`.
    pub fn query(&self, point: Vec2) -> Option<&PhysicsObject> {
        self.tree.query(point)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PhysicsObject> {
        self.tree.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PhysicsObject> {
        self.tree.get_mut(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &PhysicsObject> {
        self.tree.objects()
    }

    pub fn object_count(&self) -> usize {
        self.tree.object_count()
    }

    pub fn leaves(&self) -> Vec<LeafInfo> {
        self.tree.leaves()
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn tick(&self) -> u64 {
        self.tree.tick()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Gravity;
    const EPSILON: f32 = 1e-4;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), Settings::default()).unwrap()
    }

    #[test]
    fn test_world_new() {
        let world = world();
        assert_eq!(world.object_count(), 0);
        assert_eq!(world.tick(), 0);
        assert_eq!(world.leaves().len(), 1);
        assert!(world.query(Vec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_world_rejects_bad_config() {
        let empty = PhysicsWorld::new(BoundingBox::new(0.0, 0.0, 0.0, 10.0), Settings::default());
        assert!(matches!(empty, Err(PhysicsError::InvalidConfig { field: "bounds", .. })));

        let settings = Settings {
            sub_steps: 0,
            ..Settings::default()
        };
        let bad = PhysicsWorld::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), settings);
        assert!(matches!(bad, Err(PhysicsError::InvalidConfig { field: "sub_steps", .. })));
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut world = world();
        let ball = world.factory().circle(Vec2::new(30.0, 30.0), 2.0).unwrap();
        let id = world.spawn(ball);
        assert!(world.get(id).is_none());

        world.flush();
        assert_eq!(world.query(Vec2::new(30.0, 30.0)).map(|o| o.id()), Some(id));

        world.despawn(id);
        world.flush();
        assert!(world.get(id).is_none());
        assert_eq!(world.object_count(), 0);
    }

    #[test]
    fn test_step_uses_time_scale_and_sub_steps() {
        let settings = Settings {
            gravity: Gravity::Directional { direction: Vec2::ZERO },
            time_scale: 0.5,
            sub_steps: 4,
            ..Settings::default()
        };
        let mut world = PhysicsWorld::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), settings).unwrap();
        let mut ball = world.factory().circle(Vec2::new(10.0, 50.0), 1.0).unwrap();
        ball.velocity = Vec2::new(10.0, 0.0);
        let id = world.spawn(ball);

        world.step(1.0);

        assert_eq!(world.tick(), 4);
        assert!((world.get(id).unwrap().position.x - 15.0).abs() < EPSILON);
        assert!((world.elapsed() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_step_does_nothing() {
        let mut world = world();
        world.spawn(world.factory().circle(Vec2::new(50.0, 50.0), 1.0).unwrap());
        assert_eq!(world.step(0.0), 0);
        assert_eq!(world.tick(), 0);
        assert_eq!(world.object_count(), 1);
    }

    #[test]
    fn test_update_settings_rebuilds_on_capacity_change() {
        let mut world = world();
        for i in 0..6 {
            let ball = world.factory().circle(Vec2::new(5.0 + 10.0 * i as f32, 5.0), 1.0).unwrap();
            world.spawn(ball);
        }
        world.flush();
        assert_eq!(world.leaves().len(), 1);

        let settings = Settings {
            capacity: 2,
            ..world.settings().clone()
        };
        world.update_settings(settings).unwrap();
        world.flush();
        assert!(world.leaves().len() > 1);
        assert_eq!(world.object_count(), 6);

        let invalid = Settings {
            damping: 2.0,
            ..world.settings().clone()
        };
        assert!(world.update_settings(invalid).is_err());
        assert_eq!(world.settings().capacity, 2);
    }

    #[test]
    fn test_factory_uses_default_material() {
        let mut settings = Settings::default();
        settings.default_material.set_restitution(0.9);
        let world = PhysicsWorld::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), settings).unwrap();
        let ball = world.factory().circle(Vec2::new(5.0, 5.0), 1.0).unwrap();
        assert!((ball.material().restitution() - 0.9).abs() < EPSILON);
    }
}
