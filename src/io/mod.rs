pub mod config_io;

pub use config_io::{ConfigError, parse_config, read_config};
