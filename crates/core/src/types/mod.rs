//! Core types for the Neon storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{CartLine, CartSummary, DeliveryFeePolicy, DeliveryPolicyError};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::Order;
pub use phone::{Phone, PhoneError};
pub use price::{CurrencyCode, Price, format_amount, format_money};
pub use product::Product;
pub use status::*;
