pub mod board;
pub mod config;
pub mod settings;

pub use board::*;
pub use config::*;
pub use settings::*;
