//! Data model for catalog product records.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single affiliate product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique key, `slugify(name)`; also the image filename stem
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Non-empty list of category labels
    pub categories: Vec<String>,
    /// Image filename inside the images directory, or the placeholder
    pub image: String,
    /// Amazon or amzn.to affiliate link
    pub link: String,
}

impl Product {
    /// Returns true when the record has no usable image on disk.
    ///
    /// The placeholder counts as missing even if a file with that name exists.
    pub fn image_missing(&self, images_dir: &Path, placeholder: &str) -> bool {
        if self.image.is_empty() || self.image == placeholder {
            return true;
        }
        !images_dir.join(&self.image).is_file()
    }
}

/// Derives a record id from a display name.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `_`, and trims leading/trailing underscores.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_product(image: &str) -> Product {
        Product {
            id: "shower_chair".to_string(),
            name: "Shower Chair".to_string(),
            description: "Sit while showering.".to_string(),
            categories: vec!["Bathroom".to_string()],
            image: image.to_string(),
            link: "https://amzn.to/abc".to_string(),
        }
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Toilet Safety Rail"), "toilet_safety_rail");
        assert_eq!(slugify("Bedside Table on Wheels"), "bedside_table_on_wheels");
    }

    #[test]
    fn test_slugify_collapses_and_trims() {
        assert_eq!(slugify("  --Grab Bar!! (2-Pack)--  "), "grab_bar_2_pack");
        assert_eq!(slugify("a___b"), "a_b");
        assert_eq!(slugify("___"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_non_ascii() {
        assert_eq!(slugify("Crème Brûlée"), "cr_me_br_l_e");
        assert_eq!(slugify("ÄBC"), "bc");
    }

    #[test]
    fn test_slugify_idempotent_and_charset() {
        let inputs = [
            "Toilet Safety Rail",
            "  leading and trailing  ",
            "MiXeD_CaSe__123",
            "émoji 🚀 test",
            "a.b.c",
            "_x_",
            "",
        ];

        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {input:?}");
            assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            assert!(!once.contains("__"));
            assert!(!once.starts_with('_'));
            assert!(!once.ends_with('_'));
        }
    }

    #[test]
    fn test_image_missing_placeholder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("placeholder.png"), b"x").unwrap();

        let product = make_product("placeholder.png");
        assert!(product.image_missing(dir.path(), "placeholder.png"));
    }

    #[test]
    fn test_image_missing_file_absent_or_present() {
        let dir = TempDir::new().unwrap();
        let product = make_product("shower_chair.jpg");
        assert!(product.image_missing(dir.path(), "placeholder.png"));

        std::fs::write(dir.path().join("shower_chair.jpg"), b"x").unwrap();
        assert!(!product.image_missing(dir.path(), "placeholder.png"));
    }

    #[test]
    fn test_image_missing_empty() {
        let dir = TempDir::new().unwrap();
        assert!(make_product("").image_missing(dir.path(), "placeholder.png"));
    }
}
