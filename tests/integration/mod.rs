//! Integration tests for Content Guard.
//!
//! These tests verify end-to-end workflows including:
//! - Prompt screening and rate limiting
//! - Reply sanitization and change bounds
//! - Recovery from storage and parse failures

mod command_workflow;
mod error_recovery;
mod response_workflow;
