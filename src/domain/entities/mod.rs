//! Domain entities - Core business objects with identity

mod creature;

pub use creature::Creature;
