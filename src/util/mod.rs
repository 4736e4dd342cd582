pub mod ids;

pub use ids::{IdGenerator, SequentialIds, UuidIds};
