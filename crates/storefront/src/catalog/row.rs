//! Product sheet row parsing.
//!
//! Column layout: A=id, B=name, C=price, D-F=images, G=description,
//! H=details, I=size, J=stock, K=status.

use neon_core::{Price, Product, ProductId, ProductStatus};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::sheets::GvizRow;
use crate::sheets::gviz::{leading_decimal, leading_integer};

mod col {
    pub const ID: usize = 0;
    pub const NAME: usize = 1;
    pub const PRICE: usize = 2;
    pub const IMAGE_1: usize = 3;
    pub const IMAGE_2: usize = 4;
    pub const IMAGE_3: usize = 5;
    pub const DESCRIPTION: usize = 6;
    pub const DETAILS: usize = 7;
    pub const SIZE: usize = 8;
    pub const STOCK: usize = 9;
    pub const STATUS: usize = 10;
}

/// Minimum number of cells for a row to be considered at all.
const MIN_CELLS: usize = 3;

/// Why a sheet row did not become a catalog product.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("row has {0} cells, need at least 3")]
    TooFewCells(usize),
    #[error("row has no id")]
    MissingId,
    #[error("row {0} has no name")]
    MissingName(String),
    #[error("row {0} has no positive price")]
    NonPositivePrice(String),
    #[error("row {0} is inactive")]
    Inactive(String),
}

/// Parse one data row into a listable product.
///
/// # Errors
///
/// Returns a [`RowError`] naming the first reason the row is not listable.
pub fn parse_row(row: &GvizRow) -> Result<Product, RowError> {
    if row.len() < MIN_CELLS {
        return Err(RowError::TooFewCells(row.len()));
    }

    let id = row.text(col::ID).unwrap_or_default();
    let name = row.text(col::NAME).unwrap_or_default();
    let price = row
        .text(col::PRICE)
        .and_then(|text| leading_decimal(&text))
        .unwrap_or(Decimal::ZERO);

    let image_1 = row.text(col::IMAGE_1);
    let mut image_2 = row.text(col::IMAGE_2);
    let image_3 = row.text(col::IMAGE_3);

    let mut status = row
        .truthy_text_or_formatted(col::STATUS)
        .and_then(|token| ProductStatus::from_token(&token));

    // Older rows put the status token where the second image belongs.
    if image_2
        .as_deref()
        .is_some_and(|text| text.eq_ignore_ascii_case("active"))
    {
        image_2 = None;
        status.get_or_insert(ProductStatus::Active);
    }
    let status = status.unwrap_or_default();

    if id.is_empty() {
        return Err(RowError::MissingId);
    }
    if name.is_empty() {
        return Err(RowError::MissingName(id));
    }
    if price <= Decimal::ZERO {
        return Err(RowError::NonPositivePrice(id));
    }
    if !status.is_active() {
        return Err(RowError::Inactive(id));
    }

    let stock = row
        .text(col::STOCK)
        .and_then(|text| leading_integer(&text))
        .map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX));

    Ok(Product {
        id: ProductId::new(id),
        name,
        price: Price::new(price),
        images: [image_1, image_2, image_3].into_iter().flatten().collect(),
        description: row.text_or_formatted(col::DESCRIPTION),
        details: row.text_or_formatted(col::DETAILS),
        size: row.truthy_text_or_formatted(col::SIZE).unwrap_or_default(),
        stock,
        status,
    })
}
