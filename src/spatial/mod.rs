pub mod quadtree;
mod update;

pub use quadtree::{LeafInfo, NodeRegion, QuadTree, ROOT};
