//! Product cards, landing sections and the product detail view.

use askama::Template;
use neon_core::{CartLine, Language, Product};

use super::empty_catalog_message;
use super::images::normalize_image_url;
use crate::catalog::Catalog;
use crate::filters;

/// Product card display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    /// `$x.xx`.
    pub price: String,
    /// Raw image URLs in display order; the hover rotation walks these.
    pub images: Vec<String>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            images: product.images.clone(),
        }
    }
}

fn cards(products: &[Product]) -> Vec<ProductCardView> {
    products.iter().map(ProductCardView::from).collect()
}

/// The full product listing.
#[derive(Template)]
#[template(path = "products/grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCardView>,
    pub empty_message: &'static str,
}

impl ProductGridTemplate {
    #[must_use]
    pub fn new(catalog: &Catalog, language: Language) -> Self {
        Self {
            products: cards(&catalog.products),
            empty_message: empty_catalog_message(language),
        }
    }
}

/// The three landing-page sections.
#[derive(Template)]
#[template(path = "products/landing.html")]
pub struct LandingTemplate {
    pub on_sale: Vec<ProductCardView>,
    pub new_arrivals: Vec<ProductCardView>,
    pub top_selling: Vec<ProductCardView>,
    pub empty_message: &'static str,
}

impl LandingTemplate {
    #[must_use]
    pub fn new(catalog: &Catalog, language: Language) -> Self {
        let sections = catalog.landing_sections();
        Self {
            on_sale: cards(sections.on_sale),
            new_arrivals: cards(sections.new_arrivals),
            top_selling: cards(sections.top_selling),
            empty_message: empty_catalog_message(language),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_sale.is_empty() && self.new_arrivals.is_empty() && self.top_selling.is_empty()
    }
}

/// Product detail display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    /// `$x.xx HKD`.
    pub price: String,
    pub description: String,
    pub details: String,
    pub size: String,
    /// Direct image links; the first is the main image, all are thumbnails.
    pub images: Vec<String>,
}

impl ProductDetailView {
    /// Detail for a cart line: the live catalog product when it is still
    /// listed, otherwise the snapshot stored on the line.
    #[must_use]
    pub fn for_cart_line(line: &CartLine, catalog: &Catalog) -> Self {
        catalog.find(&line.id).map_or_else(
            || Self {
                id: line.id.to_string(),
                name: line.name.clone(),
                price: line.price.display_with_currency(),
                description: String::new(),
                details: String::new(),
                size: line.size.clone().unwrap_or_default(),
                images: line.images.iter().map(|url| normalize_image_url(url)).collect(),
            },
            Self::from,
        )
    }

    #[must_use]
    pub fn main_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Thumbnails are only worth showing with more than one image.
    #[must_use]
    pub fn has_thumbnails(&self) -> bool {
        self.images.len() > 1
    }
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display_with_currency(),
            description: product.description.trim().to_string(),
            details: product.details.trim().to_string(),
            size: product.size.clone(),
            images: product.images.iter().map(|url| normalize_image_url(url)).collect(),
        }
    }
}

/// The product detail modal body.
#[derive(Template)]
#[template(path = "products/detail.html")]
pub struct ProductDetailTemplate {
    pub product: ProductDetailView,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use neon_core::{Price, ProductId, ProductStatus};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Price::new(Decimal::new(1250, 2)),
            images: vec!["https://imgur.com/abc".to_string()],
            description: " Glows \n".to_string(),
            details: String::new(),
            size: "5cm".to_string(),
            stock: 1,
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn test_card_view_formats_price() {
        let card = ProductCardView::from(&product("LS00001"));
        assert_eq!(card.price, "$12.50");
        assert_eq!(card.images, vec!["https://imgur.com/abc"]);
    }

    #[test]
    fn test_detail_prefers_catalog_product() {
        let catalog = Catalog::from_products(vec![product("LS00001")]);
        let mut line = CartLine::from_product(&product("LS00001"));
        line.name = "Old name".to_string();

        let detail = ProductDetailView::for_cart_line(&line, &catalog);
        assert_eq!(detail.name, "Item LS00001");
        assert_eq!(detail.price, "$12.50 HKD");
        assert_eq!(detail.description, "Glows");
        assert_eq!(detail.main_image(), Some("https://i.imgur.com/abc.png"));
        assert!(!detail.has_thumbnails());
    }

    #[test]
    fn test_detail_falls_back_to_line_snapshot() {
        let line = CartLine::from_product(&product("LS00009"));
        let detail = ProductDetailView::for_cart_line(&line, &Catalog::default());
        assert_eq!(detail.name, "Item LS00009");
        assert!(detail.description.is_empty());
        assert_eq!(detail.price, "$12.50 HKD");
    }

    #[test]
    fn test_grid_renders_cards_and_empty_state() {
        let catalog = Catalog::from_products(vec![product("LS00002"), product("LS00001")]);
        let html = ProductGridTemplate::new(&catalog, Language::En).render().unwrap();
        let first = html.find("LS00001").unwrap();
        let second = html.find("LS00002").unwrap();
        assert!(first < second);
        assert!(html.contains("i.imgur.com") && html.contains("abc.png"));

        let empty = ProductGridTemplate::new(&Catalog::default(), Language::Zh)
            .render()
            .unwrap();
        assert!(empty.contains("暫時沒有商品"));
    }

    #[test]
    fn test_landing_sections() {
        let products = (1..=14).map(|n| product(&format!("LS{n:05}"))).collect();
        let template = LandingTemplate::new(&Catalog::from_products(products), Language::En);
        assert_eq!(template.on_sale.len(), 4);
        assert_eq!(template.new_arrivals[0].id, "LS00005");
        assert_eq!(template.top_selling.len(), 4);
        assert!(!template.render().unwrap().contains("LS00013"));
    }

    #[test]
    fn test_detail_template() {
        let html = ProductDetailTemplate {
            product: ProductDetailView::from(&product("LS00001")),
        }
        .render()
        .unwrap();
        assert!(html.contains("$12.50 HKD"));
        assert!(html.contains("data-id=\"LS00001\""));
    }
}
