//! Worksheet Request Client
//!
//! Drives the worksheet backend from a single page: upload scans, review and
//! compile the recognised LaTeX, generate a second variant at another
//! difficulty, inspect and copy sources, and browse recent history.
//!
//! - `api`: typed HTTP client for the four backend endpoints
//! - `controller`: page events → requests → view-model updates
//! - `page` / `views`: the view-model and its escaped HTML rendering

pub mod api;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod domain;
pub mod html;
pub mod page;
pub mod protocol;
pub mod telemetry;
pub mod util;
pub mod views;

#[cfg(test)]
mod mock_backend;
