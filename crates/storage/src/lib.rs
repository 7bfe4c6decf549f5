// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Persistence for the orchestration core: the `Store` trait (comment
//! cursors + run history, SPEC_FULL.md §6) and its two implementations — a
//! `rusqlite`-backed `SqliteStore` for production, an `InMemoryStore` for
//! tests.

mod schema;
mod store;
mod sqlite;

#[cfg(any(test, feature = "test-support"))]
mod memory;

pub use schema::migrate;
pub use store::{RunHistoryEntry, Store, StoreError};
pub use sqlite::SqliteStore;

#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryStore;
