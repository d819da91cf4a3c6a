//! Medical image analysis - sends an uploaded image and a fixed instruction
//! prompt to a hosted multimodal model and shows the returned report
//!
//! The inference client lives in [`ai`], the upload page in [`ui`], and
//! [`app`] wires both to the environment configuration.

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod ui;

pub use error::{ConfigError, Error, RequestError, Result, ValidationError};
