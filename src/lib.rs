//! Content Guard
//!
//! A guardrail engine that sits between end users, a language model and the
//! live content of a public website. Prompts are screened before they reach
//! the model; model replies are validated, sanitized and bounded before they
//! may overwrite the site's featured programs and news.
//!
//! # Features
//!
//! - Categorized threat pattern detection with a generic user-facing message
//! - Per-identity fixed-window rate limiting
//! - Privacy-preserving audit trail (hashes, never raw text)
//! - JSON extraction, field sanitization and structural checks on replies
//! - Change-magnitude bounds that never wipe a live category
//! - MCP stdio server exposing the guard as tools
//!
//! # Quick Start
//!
//! ```bash
//! DATABASE_PATH=./data/content-guard.db ./content-guard
//! ```
//!
//! # Architecture
//!
//! ```text
//!  user prompt ──▶ CommandValidator ──▶ model ──▶ ResponseValidator ──▶ site content
//!                        │                               │
//!                        └────────── AuditTrail ◀────────┘
//!                                        │
//!                                        ▼
//!                                 BlobStore (SQLite)
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use content_guard::content::SiteContent;
//! use content_guard::guard::Guard;
//! use content_guard::storage::MemoryBlobStore;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let guard = Guard::with_defaults(Arc::new(MemoryBlobStore::new()));
//!
//! let verdict = guard.validate_command("Add a news item about the open day", Some("editor")).await;
//! assert!(verdict.is_valid);
//!
//! let reply = r#"{"latestNews": [{"title": "Open day", "date": "2024-06-01"}]}"#;
//! let verdict = guard.validate_response(reply, &SiteContent::default(), Some("editor")).await;
//! assert!(verdict.is_valid);
//! assert_eq!(verdict.sanitized_content.latest_news[0].category, "General");
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod audit;
pub mod command;
pub mod config;
pub mod content;
pub mod error;
pub mod guard;
pub mod metrics;
pub mod response;
pub mod server;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_utils;
