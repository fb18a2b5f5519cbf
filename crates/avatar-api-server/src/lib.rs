pub mod config;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod services;
pub mod utils;
