//! Shared types for the Osprey security scan management platform.
//!
//! The [entities] module holds the persisted shapes the core engine reads
//! and mutates. Everything here is plain data; all behavior lives in
//! `osprey_core`.

pub mod busy;
pub mod entities;
