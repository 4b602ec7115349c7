// src/error/mod.rs
//
// Application error taxonomy

pub mod types;

pub use types::{AppError, AppResult, ErrorCategory};
