pub mod error;
pub mod material;
pub mod settings;

pub use error::{PhysicsError, Result};
pub use material::Material;
pub use settings::{Gravity, Settings};
