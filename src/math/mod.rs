pub mod arena;

pub use arena::{WeightArena, WeightView};
