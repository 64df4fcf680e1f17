//! Custom Askama template filters.

use std::fmt::Display;

use crate::render::normalize_image_url;

/// Rewrites imgur page links to direct image links.
///
/// Usage in templates: `{{ image|display_image }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn display_image(url: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(normalize_image_url(&url.to_string()))
}
