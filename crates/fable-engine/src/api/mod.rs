//! Public surface: the engine loop, behaviors and shared id/error types.

pub mod engine;
pub mod types;
