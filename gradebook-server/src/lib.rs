//! Gradebook Server
//!
//! Resolves each roster member's most recently touched source file on the
//! code host and scores it against a reference solution with an LLM oracle.
//!
//! Architecture:
//! - Configuration: Process settings from the environment
//! - Services: Address parsing, submission resolution, grading, batching
//! - API: axum routes exposing batch grading and question synthesis

pub mod api;
pub mod config;
pub mod service;
