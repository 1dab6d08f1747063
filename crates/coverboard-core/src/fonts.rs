//! Web font bookkeeping for image overlays.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Weights requested when the caller doesn't name any.
pub const DEFAULT_FONT_WEIGHTS: &[u16] = &[400, 700];

/// A stylesheet the host should attach to load a font family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRequest {
    pub family: String,
    pub href: String,
}

/// Tracks which font families have been requested.
///
/// Each family is requested once; a failed load can be forgotten with
/// [`FontRegistry::mark_failed`] so the next request retries it.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    stylesheet_base: String,
    requested: HashSet<String>,
}

impl FontRegistry {
    pub fn new(stylesheet_base: impl Into<String>) -> Self {
        Self {
            stylesheet_base: stylesheet_base.into(),
            requested: HashSet::new(),
        }
    }

    /// Stylesheet link for `family`, or `None` if it was already requested.
    pub fn request(&mut self, family: &str, weights: &[u16]) -> Option<FontRequest> {
        let family = family.trim();
        if family.is_empty() || !self.requested.insert(family.to_string()) {
            return None;
        }
        log::debug!("Requesting font family {}", family);
        Some(FontRequest {
            family: family.to_string(),
            href: self.stylesheet_href(family, weights),
        })
    }

    /// Forget a family whose stylesheet failed to load.
    pub fn mark_failed(&mut self, family: &str) {
        if self.requested.remove(family.trim()) {
            log::warn!("Font family {} failed to load", family);
        }
    }

    pub fn is_loaded(&self, family: &str) -> bool {
        self.requested.contains(family.trim())
    }

    fn stylesheet_href(&self, family: &str, weights: &[u16]) -> String {
        let weights = if weights.is_empty() { DEFAULT_FONT_WEIGHTS } else { weights };
        let weights = weights.iter().map(u16::to_string).collect::<Vec<_>>().join(";");
        format!(
            "{}?family={}:wght@{}&display=swap",
            self.stylesheet_base,
            family.replace(' ', "+"),
            weights
        )
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new("https://fonts.googleapis.com/css2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_once() {
        let mut fonts = FontRegistry::default();
        let request = fonts.request("Playfair Display", &[]).expect("first request");
        assert_eq!(
            request.href,
            "https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;700&display=swap"
        );
        assert!(fonts.is_loaded("Playfair Display"));
        assert!(fonts.request("Playfair Display", &[400]).is_none());
    }

    #[test]
    fn test_custom_weights() {
        let mut fonts = FontRegistry::new("https://fonts.example/css");
        let request = fonts.request("Inter", &[300, 500, 900]).expect("first request");
        assert_eq!(request.href, "https://fonts.example/css?family=Inter:wght@300;500;900&display=swap");
    }

    #[test]
    fn test_failed_font_can_be_retried() {
        let mut fonts = FontRegistry::default();
        assert!(fonts.request("Lora", &[]).is_some());
        fonts.mark_failed("Lora");
        assert!(!fonts.is_loaded("Lora"));
        assert!(fonts.request("Lora", &[]).is_some());
    }

    #[test]
    fn test_blank_family_is_ignored() {
        let mut fonts = FontRegistry::default();
        assert!(fonts.request("  ", &[]).is_none());
    }
}
