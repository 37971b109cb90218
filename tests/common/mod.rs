//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary path resolution (via `get_hadron_binary`)
//! - Isolated command environments and fake runtimes (via `helpers`)

pub(crate) mod helpers;

// Re-export get_hadron_binary for convenient access
#[allow(unused_imports)]
pub(crate) use helpers::get_hadron_binary;
