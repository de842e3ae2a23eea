pub mod border;
pub mod contacts;
pub mod detection;
pub mod info;
pub mod solver;

// Re-export key types
pub use border::{Border, BorderEdge};
pub use contacts::{border_contact_points, find_contact_points, ContactPoints};
pub use detection::test_collision;
pub use info::CollisionInfo;
pub use solver::{handle_border_collisions, solve_collision};
