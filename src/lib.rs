pub mod api;
pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;

pub use error::{AppError, Result};
