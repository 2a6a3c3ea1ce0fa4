//! Shared test fixtures for kernjit crates.
//!
//! This crate provides buffers and data generators for exercising compiled
//! kernels. It does NOT depend on `kernjit` so the engine crate can use it
//! from its own unit tests without a dependency cycle.
//!
//! - [`buffers`] - Buffers with a sentinel tail for overrun detection
//! - [`vectors`] - Deterministic, seeded input vectors
//! - [`reference`] - Scalar reference evaluation of a fused kernel
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! kernjit-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use kernjit_test::{GuardedBuffer, VectorGen, fused_reference};
//! ```

pub mod buffers;
pub mod reference;
pub mod vectors;

pub use buffers::{GuardedBuffer, GUARD_LEN, SENTINEL};
pub use reference::fused_reference;
pub use vectors::VectorGen;
