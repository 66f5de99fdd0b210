pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod service;
pub mod ui;
