//! Core logic: permission gate, scan retrier and survey facade

pub mod authorization;
pub mod error;
pub mod scanner;
pub mod service;
pub mod types;
