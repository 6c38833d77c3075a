pub mod config;
pub mod inject;
pub mod pipeline;
pub mod server;

pub use config::Config;
