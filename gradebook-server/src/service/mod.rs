//! Service Module
//!
//! The grading pipeline. Services are plain structs over the client traits
//! so they can run against the real hosts or against test doubles.

pub mod address;
pub mod batch;
pub mod grading;
pub mod question;
pub mod resolver;

// Re-export for convenience
pub use batch as batch_service;
pub use question as question_service;
