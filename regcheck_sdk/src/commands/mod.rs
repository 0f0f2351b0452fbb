//! Command execution configurations for host identity lookups
//!
//! Provides whitelisted command executors for secure system queries.

pub mod windows;

pub use windows::create_windows_command_executor;
