//! Data access adapters for the trip map editor.
//!
//! Responsibilities:
//! - Implement the provider traits defined in `tripmap-core` against real
//!   services.
//! - Encapsulate wire formats and their decoding.
//!
//! Boundaries:
//! - Do not encode editor rules (live in `tripmap-core`).
//! - Keep blocking I/O off async executors; use async-capable clients.
//!
//! Invariants:
//! - Providers are `Send + Sync` and safe to share behind an `Arc`.
//! - No global mutable state.

pub mod geocoding;
