//! Neon Storefront library.
//!
//! The catalog, cart and checkout engine behind the storefront pages. A
//! page builds one [`state::Storefront`] on load; every component inside it
//! reads and writes the same [`storage::KeyValueStore`], which is the only
//! source of truth between page loads.
//!
//! # Modules
//!
//! - [`catalog`] - product sheet loading with a timestamped cache
//! - [`cart`] - the persisted cart and its page actions
//! - [`render`] - view models, templates, image rotation and the review carousel
//! - [`checkout`] - form validation, order history and owner notification
//! - [`address`] - pickup-locker address autocomplete
//! - [`preferences`] - theme and language

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
mod filters;
pub mod preferences;
pub mod render;
pub mod sheets;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod validate;
