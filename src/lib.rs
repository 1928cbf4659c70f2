//! Library exports for the real-estate listing backend
//!
//! This module exposes internal components for testing and potential library usage.

pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod image;
pub mod inquiry;
pub mod middleware;
pub mod model;
pub mod query;
pub mod route;
