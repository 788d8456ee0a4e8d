//! City layer - the grid collaborator used for collision and tile surfaces

pub mod map;

pub use map::{CityMap, MapData, TileKind};
