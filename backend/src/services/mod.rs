//! Business logic services.
//!
//! Services validate input, enforce business rules, and coordinate
//! repositories. Handlers never touch the database directly.

pub mod user_service;
