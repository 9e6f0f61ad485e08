//! HLS upload service
//!
//! Accepts file and video uploads, stores files in S3, transcodes videos
//! into HLS with ffmpeg and serves the results.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
