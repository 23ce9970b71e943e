pub mod entity;

pub use entity::{Movie, MovieSnapshot};
