//! Integration tests for fxwatch-app.
//!
//! These tests verify the interaction between components:
//! - Feed connection lifecycle against a mock server
//! - Trade delivery into the price table
//! - Reconnect and shutdown behavior

pub mod common;
