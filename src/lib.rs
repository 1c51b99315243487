pub mod common;
pub mod config;
pub mod drivers;
pub mod migration;
pub mod prompt;
