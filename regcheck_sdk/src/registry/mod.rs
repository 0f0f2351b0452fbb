//! Platform registry backends
//!
//! The native backend is only compiled on Windows; elsewhere
//! [`UnsupportedRegistry`] reports every query as a platform failure so rule
//! sets still produce one result per rule.

pub mod unsupported;
#[cfg(windows)]
pub mod windows;

pub use unsupported::UnsupportedRegistry;
#[cfg(windows)]
pub use windows::WindowsRegistry;
