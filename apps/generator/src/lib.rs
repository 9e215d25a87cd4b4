pub mod config;
pub mod content;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod render;
