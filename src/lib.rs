pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod profile;
pub mod report;
pub mod source;
pub mod tuned;
