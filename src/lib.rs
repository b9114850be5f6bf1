pub mod archive;
pub mod cache;
pub mod commands;
pub mod download;
pub mod error;
pub mod http;
pub mod loader;
pub mod package;
pub mod paths;
pub mod profile;
pub mod resolve;
pub mod runtime;
