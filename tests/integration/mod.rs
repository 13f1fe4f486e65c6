//! Integration tests for kvquery
//!
//! These tests exercise the public API only.
//! Run with: cargo test --test integration

mod helpers;

mod allocator;
mod codec;
mod fast_path;
mod lifecycle;
mod parse;
