pub mod collection;
pub mod collision;
pub mod common;
pub mod integration;
pub mod math;
pub mod objects;
pub mod shapes;
pub mod spatial;
pub mod world;

// Re-export key types for easier use
pub use collision::CollisionInfo;
pub use common::{Gravity, Material, PhysicsError, Result, Settings};
pub use math::{BoundingBox, Vec2};
pub use objects::{ObjectFactory, ObjectId, PhysicsObject};
pub use shapes::{Circle, ConcavePolygon, ConvexPolygon, Rectangle, Shape};
pub use spatial::QuadTree;
pub use world::PhysicsWorld;
