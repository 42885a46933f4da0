//! # Employee Management API Library
//!
//! This library provides the core functionality for the Employee Management
//! service, including use cases, persistence, handlers and server configuration.

pub mod application;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
