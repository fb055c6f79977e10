//! Data Transfer Objects for the server HTTP API
//!
//! Request and response bodies exchanged between the grading server and its
//! callers (the CLI, or any surrounding application).

pub mod grade;
pub mod question;
pub mod repo;
