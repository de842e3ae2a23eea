pub mod bounding_box;
pub mod projection;
pub mod transform;
pub mod vec2;

pub use bounding_box::BoundingBox;
pub use projection::Projection;
pub use transform::Transform;
pub use vec2::Vec2;
