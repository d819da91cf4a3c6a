//! Web page for uploading an image and reading the analysis report
//!
//! The server keeps no per-user state: each form submission rebuilds a
//! [`Session`] from the posted fields, runs at most one analysis and renders
//! the result.

pub mod markdown;
pub mod routes;
pub mod session;
pub mod view;

pub use routes::{router, AppState};
pub use session::{Phase, Session};
