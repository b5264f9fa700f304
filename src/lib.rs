// label-helper - Elder-friendly product label reader
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod speech;
pub mod summary;
pub mod utils;
pub mod vision;
