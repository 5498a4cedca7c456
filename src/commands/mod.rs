//! CLI-facing entry points.

pub mod config;
mod execute;
mod reverse;

pub use config::Config;
pub use execute::execute;
pub use reverse::reverse;
