//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for different API domains,
//! such as user management and health probes, excluding core authentication
//! routes which are handled separately.

pub mod common;
pub mod health;
pub mod user;
