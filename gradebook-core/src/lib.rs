//! Gradebook Core
//!
//! Core types and abstractions for the Gradebook roster grader.
//!
//! This crate contains:
//! - Domain types: Repositories, history entries, submissions, grades and roster entries
//! - DTOs: Data transfer objects for the server HTTP API

pub mod domain;
pub mod dto;
