/// State management module
///
/// This module handles all application state, including:
/// - Database connection and queries (library.rs)
/// - Shared data structures (data.rs)

pub mod library;
pub mod data;
