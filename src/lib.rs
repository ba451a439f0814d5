// ABOUTME: Library root for nephos - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod decision;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod output;
pub mod plan;
pub mod providers;
pub mod registry;
