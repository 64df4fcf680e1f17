//! Product and cart presentation.
//!
//! Views are plain projections of catalog and cart state with prices
//! already formatted. Indices and ids are re-derived on every render since
//! cart indices shift after each mutation; nothing here caches them.

pub mod carousel;
pub mod cart;
pub mod images;
pub mod product;

pub use carousel::{CarouselController, ReviewCarousel};
pub use cart::{CartItemView, CartItemsTemplate, CartSummaryTemplate, CartSummaryView, CartView, ColorOption};
pub use images::{HoverRotation, normalize_image_url};
pub use product::{
    LandingTemplate, ProductCardView, ProductDetailTemplate, ProductDetailView, ProductGridTemplate,
};

use neon_core::Language;

/// Shown in place of the item list when the cart is empty.
#[must_use]
pub const fn empty_cart_message(language: Language) -> &'static str {
    match language {
        Language::Zh => "您的購物車是空的",
        Language::En => "Your cart is empty",
    }
}

/// Shown in place of the product grid when the catalog is empty.
#[must_use]
pub const fn empty_catalog_message(language: Language) -> &'static str {
    match language {
        Language::Zh => "暫時沒有商品",
        Language::En => "No products available",
    }
}
