//! Property-based tests for the loomcrawl concurrency core.
//!
//! Run with: cargo test --test property_tests
//!
//! These tests use proptest to generate random configurations and verify
//! that the invariants named for each subsystem hold regardless of the
//! specific inputs drawn.

mod property;
