//! # Price Comparison Library
//!
//! Procurement price comparisons: makers build vendor quotation sheets,
//! checkers approve or reject them. The crate exposes the HTTP layer, the
//! persistence layer and the pure authorization and lifecycle rules the
//! handlers are built on.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod password;
pub mod permissions;
pub mod pricing;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
