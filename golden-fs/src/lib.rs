//! Filesystem abstraction for the golden harness.
//!
//! This crate provides:
//! - Filesystem trait for reading fixtures and writing candidate fixtures
//! - RealFilesystem backed by `std::fs`
//! - MockFilesystem for deterministic tests, including injected write faults

pub mod fs;

pub use fs::{sibling_with_suffix, Filesystem, FsError, MockFilesystem, RealFilesystem};
