//! Core domain types
//!
//! This module contains the core domain structures used across Gradebook services.
//! These types are shared between the server (which produces them while grading)
//! and the clients (which fetch them from the code host or receive them over HTTP).

pub mod grade;
pub mod repository;
pub mod roster;
