//! TOML-backed catalog store with minimal-diff writes.
//!
//! The file is a sequence of `[[products]]` tables. Reads go through the
//! `toml` parser; writes are targeted text edits (append a block, rewrite a
//! single `image` value located through `toml_edit` spans) so comments and
//! formatting survive byte-for-byte. Every edit is re-parsed and checked against the
//! expected record list before it is accepted.

use crate::catalog::models::{slugify, Product};
use crate::error::CatalogError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};
use toml_edit::{ImDocument, Item, Value};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Serialize)]
struct RecordBlock<'a> {
    products: &'a [Product],
}

/// In-memory view of the catalog file: the raw text plus its parsed records.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
    source: String,
    products: Vec<Product>,
}

impl CatalogStore {
    /// Reads and parses the catalog at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading catalog from: {}", path.display());

        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        Self::from_source(path, source)
    }

    /// Builds a store from already-read text.
    pub fn from_source(path: impl Into<PathBuf>, source: String) -> Result<Self> {
        let path = path.into();
        let products = parse_products(&path, &source)?;
        debug!("Parsed {} products", products.len());

        Ok(Self { path, source, products })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file text, including any pending edits.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    /// Category vocabulary: every category used by any record, sorted and deduplicated.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .flat_map(|p| p.categories.iter())
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Appends a new record at the end of the file.
    pub fn append(&mut self, product: Product) -> Result<()> {
        if self.contains_id(&product.id) {
            return Err(CatalogError::DuplicateId(product.id).into());
        }
        if product.categories.is_empty() {
            anyhow::bail!("Product \"{}\" must have at least one category", product.id);
        }

        let block = toml::to_string(&RecordBlock { products: std::slice::from_ref(&product) })
            .context("Failed to serialize product record")?;

        let existing = self.source.trim_end();
        let mut updated = if existing.is_empty() {
            block
        } else {
            format!("{}\n\n{}", existing, block)
        };
        if !updated.ends_with('\n') {
            updated.push('\n');
        }

        let mut expected = self.products.clone();
        expected.push(product);
        self.commit(updated, expected)
    }

    /// Rewrites the `image` value of the record with the given id, leaving
    /// every other byte of the file untouched.
    pub fn set_image(&mut self, id: &str, filename: &str) -> Result<()> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::RecordNotFound(id.to_string()))?;

        let value = image_value_span(&self.source, id).ok_or_else(|| {
            self.parse_error(format!("record \"{}\" has no image value", id))
        })?;

        let literal = serde_json::to_string(filename).context("Failed to quote image filename")?;
        let mut updated = String::with_capacity(self.source.len() + literal.len());
        updated.push_str(&self.source[..value.start]);
        updated.push_str(&literal);
        updated.push_str(&self.source[value.end..]);

        let mut expected = self.products.clone();
        expected[index].image = filename.to_string();
        self.commit(updated, expected)
    }

    /// Writes the current text back to the catalog path.
    pub fn save(&self) -> Result<()> {
        debug!("Writing catalog to: {}", self.path.display());
        std::fs::write(&self.path, &self.source)
            .with_context(|| format!("Failed to write catalog file: {}", self.path.display()))
    }

    /// Accepts an edited source only if it parses back to exactly `expected`.
    fn commit(&mut self, source: String, expected: Vec<Product>) -> Result<()> {
        let reparsed = parse_products(&self.path, &source)?;
        if reparsed != expected {
            return Err(self.parse_error("edit did not produce the expected records".into()).into());
        }

        self.source = source;
        self.products = reparsed;
        Ok(())
    }

    fn parse_error(&self, message: String) -> CatalogError {
        CatalogError::CatalogParse { path: self.path.display().to_string(), message }
    }
}

fn parse_products(path: &Path, source: &str) -> Result<Vec<Product>, CatalogError> {
    let parse_error =
        |message: String| CatalogError::CatalogParse { path: path.display().to_string(), message };

    let file: CatalogFile = toml::from_str(source).map_err(|e| parse_error(e.to_string()))?;

    let mut seen = HashSet::new();
    for product in &file.products {
        if product.id.is_empty() {
            return Err(parse_error(format!("product \"{}\" has an empty id", product.name)));
        }
        if slugify(&product.id) != product.id {
            return Err(parse_error(format!("product id \"{}\" is not a valid slug", product.id)));
        }
        if !seen.insert(product.id.as_str()) {
            return Err(parse_error(format!("duplicate product id \"{}\"", product.id)));
        }
        if product.categories.is_empty() {
            return Err(parse_error(format!("product \"{}\" has no categories", product.id)));
        }
    }

    Ok(file.products)
}

/// Byte range of the `image` value literal of the record with the given id.
///
/// Only the literal itself is covered; surrounding whitespace and any trailing
/// comment stay outside the range.
fn image_value_span(source: &str, id: &str) -> Option<Range<usize>> {
    let document = ImDocument::parse(source).ok()?;

    match document.as_table().get("products")? {
        Item::ArrayOfTables(tables) => tables
            .iter()
            .find(|t| t.get("id").and_then(Item::as_str) == Some(id))?
            .get("image")?
            .as_value()?
            .span(),
        Item::Value(Value::Array(array)) => array
            .iter()
            .filter_map(Value::as_inline_table)
            .find(|t| t.get("id").and_then(Value::as_str) == Some(id))?
            .get("image")?
            .span(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CATALOG: &str = r#"# Recovery products shown on the site.

[[products]]
id = "toilet_safety_rail"
name = "Toilet Safety Rail"
description = "Helps you get on and off the toilet."
categories = ["Mobility", "Bathroom"]
image = "toilet_safety_rail.jpg"
link = "https://amzn.to/43QfcXt"

[[products]]   # keep this one first in the grid
id = 'bedside_table'
name = "Bedside Table"
description = "Slides under the bed."
categories = ["Bedroom", "Miscellaneous"]
image   =   'placeholder.png'
link = "https://amzn.to/3LFMFxm"
"#;

    fn make_store() -> CatalogStore {
        CatalogStore::from_source("catalog.toml", CATALOG.to_string()).unwrap()
    }

    fn make_product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Grab Bar".to_string(),
            description: "Suction \"grab\" bar".to_string(),
            categories: vec!["Bathroom".to_string()],
            image: format!("{}.jpg", id),
            link: "https://www.amazon.com/dp/B000000000".to_string(),
        }
    }

    #[test]
    fn test_parse_products() {
        let store = make_store();
        assert_eq!(store.products().len(), 2);
        assert_eq!(store.products()[1].id, "bedside_table");
        assert_eq!(store.products()[1].image, "placeholder.png");
    }

    #[test]
    fn test_categories_sorted_unique() {
        let store = make_store();
        assert_eq!(store.categories(), vec!["Bathroom", "Bedroom", "Miscellaneous", "Mobility"]);
    }

    #[test]
    fn test_empty_source_has_no_products() {
        let store = CatalogStore::from_source("catalog.toml", String::new()).unwrap();
        assert!(store.products().is_empty());
        assert!(store.categories().is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected_on_load() {
        let source = format!("{}\n{}", CATALOG, &CATALOG[CATALOG.find("[[products]]").unwrap()..]);
        let err = CatalogStore::from_source("catalog.toml", source).unwrap_err();
        assert!(err.to_string().contains("duplicate product id"));
    }

    #[test]
    fn test_empty_categories_rejected_on_load() {
        let source = r#"
[[products]]
id = "x"
name = "X"
description = ""
categories = []
image = "x.jpg"
link = "https://amzn.to/x"
"#;
        let err = CatalogStore::from_source("catalog.toml", source.to_string()).unwrap_err();
        assert!(err.to_string().contains("has no categories"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = CatalogStore::from_source("catalog.toml", "[[products]\nid=".into()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::CatalogParse { .. })
        ));
    }

    #[test]
    fn test_append_preserves_existing_text() {
        let mut store = make_store();
        store.append(make_product("grab_bar")).unwrap();

        let source = store.source();
        assert!(source.starts_with(CATALOG.trim_end()));
        assert!(source.ends_with('\n'));
        assert!(!source.ends_with("\n\n"));
        assert_eq!(store.products().len(), 3);
        assert_eq!(store.products()[2].description, "Suction \"grab\" bar");

        // The new text parses back on its own
        let reloaded = CatalogStore::from_source("catalog.toml", source.to_string()).unwrap();
        assert_eq!(reloaded.products(), store.products());
    }

    #[test]
    fn test_append_into_empty_file() {
        let mut store = CatalogStore::from_source("catalog.toml", String::new()).unwrap();
        store.append(make_product("grab_bar")).unwrap();
        assert!(store.source().starts_with("[[products]]"));
        assert_eq!(store.products().len(), 1);
    }

    #[test]
    fn test_append_duplicate_rejected() {
        let mut store = make_store();
        let before = store.source().to_string();

        let err = store.append(make_product("toilet_safety_rail")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::DuplicateId(id)) if id == "toilet_safety_rail"
        ));
        assert_eq!(store.source(), before);
    }

    #[test]
    fn test_append_without_categories_rejected() {
        let mut store = make_store();
        let mut product = make_product("grab_bar");
        product.categories.clear();
        assert!(store.append(product).is_err());
        assert_eq!(store.products().len(), 2);
    }

    #[test]
    fn test_set_image_touches_only_one_value() {
        let mut store = make_store();
        store.set_image("bedside_table", "bedside_table.webp").unwrap();

        let expected = CATALOG.replace("'placeholder.png'", "\"bedside_table.webp\"");
        assert_eq!(store.source(), expected);
        assert_eq!(store.products()[1].image, "bedside_table.webp");
        assert_eq!(store.products()[0].image, "toilet_safety_rail.jpg");
    }

    #[test]
    fn test_set_image_first_record() {
        let mut store = make_store();
        store.set_image("toilet_safety_rail", "toilet_safety_rail.png").unwrap();

        let expected = CATALOG.replace(
            "image = \"toilet_safety_rail.jpg\"",
            "image = \"toilet_safety_rail.png\"",
        );
        assert_eq!(store.source(), expected);
    }

    #[test]
    fn test_set_image_unknown_id() {
        let mut store = make_store();
        let err = store.set_image("nope", "nope.jpg").unwrap_err();
        assert!(matches!(err.downcast_ref::<CatalogError>(), Some(CatalogError::RecordNotFound(_))));
    }

    #[test]
    fn test_set_image_crlf_line_endings() {
        let source = CATALOG.replace('\n', "\r\n");
        let mut store = CatalogStore::from_source("catalog.toml", source.clone()).unwrap();
        store.set_image("bedside_table", "bedside_table.jpg").unwrap();

        assert_eq!(
            store.source(),
            source.replace("'placeholder.png'", "\"bedside_table.jpg\"")
        );
    }

    #[test]
    fn test_load_and_save_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, CATALOG).unwrap();

        let mut store = CatalogStore::load(&path).unwrap();
        store.set_image("bedside_table", "bedside_table.jpg").unwrap();
        store.save().unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("image   =   \"bedside_table.jpg\""));
        assert!(written.starts_with("# Recovery products shown on the site."));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CatalogStore::load("/nonexistent/catalog.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"));
    }

    #[test]
    fn test_set_image_keeps_trailing_comment() {
        let source = CATALOG.replace(
            "image   =   'placeholder.png'",
            "image = \"placeholder.png\" # swap once photographed",
        );
        let mut store = CatalogStore::from_source("catalog.toml", source.clone()).unwrap();
        store.set_image("bedside_table", "bedside_table.jpg").unwrap();

        assert_eq!(
            store.source(),
            source.replace("\"placeholder.png\" #", "\"bedside_table.jpg\" #")
        );
    }

    #[test]
    fn test_set_image_ignores_header_inside_multiline_string() {
        let source = r#"[[products]]
id = "a"
name = "A"
description = """
See
[[products]]
"""
categories = ["Misc"]
image = "placeholder.png"
link = "https://amzn.to/a"
"#;
        let mut store = CatalogStore::from_source("catalog.toml", source.to_string()).unwrap();
        store.set_image("a", "a.jpg").unwrap();

        assert_eq!(store.source(), source.replace("placeholder.png", "a.jpg"));
        assert_eq!(store.products()[0].description, "See\n[[products]]\n");
    }

    #[test]
    fn test_set_image_inline_array() {
        let source = "products = [\n  { id = \"a\", name = \"A\", description = \"\", categories = [\"Misc\"], image = '', link = \"https://amzn.to/a\" },\n]\n";
        let mut store = CatalogStore::from_source("catalog.toml", source.to_string()).unwrap();
        store.set_image("a", "a.png").unwrap();

        assert_eq!(store.source(), source.replace("image = ''", "image = \"a.png\""));
    }

    #[test]
    fn test_non_slug_id_rejected_on_load() {
        let source = CATALOG.replace("id = 'bedside_table'", "id = '../bedside_table'");
        let err = CatalogStore::from_source("catalog.toml", source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::CatalogParse { message, .. }) if message.contains("../bedside_table")
        ));
    }
}
}
