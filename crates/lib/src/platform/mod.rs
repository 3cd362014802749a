//! Host platform detection.
//!
//! The build only distinguishes three operating systems. Linux and macOS are
//! recognized explicitly; every other host is treated as Windows.

pub mod os;

pub use os::Os;
