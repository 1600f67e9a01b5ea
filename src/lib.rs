pub mod cli;
pub mod config;
pub mod platform;
pub mod report;
pub mod source;
pub mod timeline;
pub mod util;
