pub mod factory;
pub mod physics_object;
pub mod sub_polygon;

pub use factory::ObjectFactory;
pub use physics_object::{ObjectId, PhysicsObject};
pub use sub_polygon::SubPolygon;
