pub mod analytics;
pub mod config;
pub mod logging;
pub mod movelog;
pub mod output;
pub mod trials;
