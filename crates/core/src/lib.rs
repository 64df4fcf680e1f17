//! Neon Core - Shared types library.
//!
//! This crate provides the domain types shared by the storefront components:
//! - `storefront` - catalog loading, cart state, rendering and checkout
//! - `integration-tests` - cross-component scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. Everything that touches persisted state or the
//! network lives in `neon-storefront`.
//!
//! # Modules
//!
//! - [`types`] - Product and cart records, orders, validated newtypes and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
