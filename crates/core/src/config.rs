use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Full configuration of a catalog build.
///
/// Every field has a default, so an empty TOML file (or none at all) is
/// valid. Relative paths in a file are resolved against that file's
/// directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub images: ImagesConfig,
    pub sku_table: SkuTableConfig,
    pub dimension_table: DimensionTableConfig,
    pub pricing: PricingConfig,
    pub storefront: StorefrontConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Directory tree holding product photographs.
    pub root: PathBuf,
    /// Leading URL segment under which `root` is served.
    pub url_prefix: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public/products"),
            url_prefix: "products".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkuTableConfig {
    pub path: PathBuf,
    /// Worksheet name; the first sheet when unset.
    pub sheet: Option<String>,
    /// 0-based row holding the column headers.
    pub header_row: usize,
    pub columns: SkuColumns,
}

impl Default for SkuTableConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/sku_master.xlsx"),
            sheet: None,
            header_row: 0,
            columns: SkuColumns::default(),
        }
    }
}

/// Header names of the SKU/alias table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkuColumns {
    pub sku: String,
    pub parent_sku: String,
    pub parent_name: String,
    pub color: String,
    pub product_name: String,
    pub mrp: String,
}

impl Default for SkuColumns {
    fn default() -> Self {
        Self {
            sku: "SKU Code".to_string(),
            parent_sku: "MTP SKU".to_string(),
            parent_name: "MTP Name".to_string(),
            color: "Child Color".to_string(),
            product_name: "SKU Product Name".to_string(),
            mrp: "MRP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DimensionTableConfig {
    /// Without a table every product is built with unknown dimensions.
    pub path: Option<PathBuf>,
    pub sheet: Option<String>,
    /// The dimensions master carries two title rows above its headers.
    pub header_row: usize,
    pub columns: DimensionColumns,
}

impl Default for DimensionTableConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("data/dimensions_master.xlsx")),
            sheet: None,
            header_row: 2,
            columns: DimensionColumns::default(),
        }
    }
}

/// Header names of the dimensions table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DimensionColumns {
    pub parent_sku: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub weight_grams: String,
}

impl Default for DimensionColumns {
    fn default() -> Self {
        Self {
            parent_sku: "MTP SKU Code".to_string(),
            length: "Lcm".to_string(),
            width: "Bcm".to_string(),
            height: "Hcm".to_string(),
            weight_grams: "PW(gm)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price used when the MRP is missing or not positive.
    pub default_price: u64,
    /// `original_price = floor(price * markup)`.
    pub markup: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_price: 4999,
            markup: 1.25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub brand: String,
    pub placeholder_image: String,
    pub default_color: String,
    /// The first N valid rows are featured.
    pub featured_count: usize,
    /// Every Nth valid row is marked new.
    pub new_every: usize,
    /// RFC 3339.
    pub created_at: String,
    /// RFC 3339.
    pub updated_at: String,
    pub material: String,
    pub finish: String,
    pub style: String,
    pub country_of_origin: String,
    pub warranty: String,
    pub care_instructions: Vec<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            brand: "Bluewud".to_string(),
            placeholder_image: "/images/placeholder-furniture.jpg".to_string(),
            default_color: "Natural Wood".to_string(),
            featured_count: 16,
            new_every: 5,
            created_at: "2024-01-15T00:00:00Z".to_string(),
            updated_at: "2024-12-01T00:00:00Z".to_string(),
            material: "Engineered Wood".to_string(),
            finish: "Laminate".to_string(),
            style: "Modern".to_string(),
            country_of_origin: "India".to_string(),
            warranty: "1 Year Manufacturer Warranty".to_string(),
            care_instructions: vec![
                "Wipe with dry cloth".to_string(),
                "Avoid direct sunlight".to_string(),
            ],
        }
    }
}

impl StorefrontConfig {
    pub fn created_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn updated_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON array of assembled products.
    pub products: PathBuf,
    /// CSV report of products without real images.
    pub report: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            products: PathBuf::from("src/data/products.json"),
            report: PathBuf::from("missing_images_report.csv"),
        }
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

impl CatalogConfig {
    /// Load a TOML file. Relative paths inside it are taken relative to the
    /// file's own directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without touching paths.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Config from `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would produce a nonsensical catalog.
    pub fn validate(&self) -> Result<()> {
        if !self.pricing.markup.is_finite() || self.pricing.markup < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "pricing.markup must be at least 1.0, got {}",
                self.pricing.markup
            )));
        }
        if self.pricing.default_price == 0 {
            return Err(Error::InvalidConfig(
                "pricing.default_price must be positive".to_string(),
            ));
        }
        if self.storefront.new_every == 0 {
            return Err(Error::InvalidConfig(
                "storefront.new_every must be positive".to_string(),
            ));
        }
        self.storefront.created_at()?;
        self.storefront.updated_at()?;
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        rebase_path(&mut self.images.root, base);
        rebase_path(&mut self.sku_table.path, base);
        if let Some(p) = self.dimension_table.path.as_mut() {
            rebase_path(p, base);
        }
        rebase_path(&mut self.output.products, base);
        rebase_path(&mut self.output.report, base);
    }

    pub fn with_image_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.images.root = root.into();
        self
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.images.url_prefix = prefix.into();
        self
    }

    pub fn with_sku_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.sku_table.path = path.into();
        self
    }

    pub fn with_dimension_table(mut self, path: Option<PathBuf>) -> Self {
        self.dimension_table.path = path;
        self
    }

    pub fn with_products_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.products = path.into();
        self
    }

    pub fn with_report_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.report = path.into();
        self
    }
}

fn rebase_path(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.images.url_prefix, "products");
        assert_eq!(config.sku_table.header_row, 0);
        assert_eq!(config.dimension_table.header_row, 2);
        assert_eq!(config.pricing.default_price, 4999);
        assert_eq!(config.pricing.markup, 1.25);
        assert_eq!(config.storefront.featured_count, 16);
        assert_eq!(config.storefront.new_every, 5);
        assert_eq!(config.sku_table.columns.sku, "SKU Code");
        assert_eq!(config.dimension_table.columns.weight_grams, "PW(gm)");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = CatalogConfig::from_toml_str("").unwrap();
        assert_eq!(config.storefront.brand, "Bluewud");
        assert_eq!(config.output.report, PathBuf::from("missing_images_report.csv"));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = CatalogConfig::from_toml_str(
            r#"
            [pricing]
            markup = 1.5

            [sku_table.columns]
            color = "Colour"
            "#,
        )
        .unwrap();
        assert_eq!(config.pricing.markup, 1.5);
        assert_eq!(config.pricing.default_price, 4999);
        assert_eq!(config.sku_table.columns.color, "Colour");
        assert_eq!(config.sku_table.columns.sku, "SKU Code");
    }

    #[test]
    fn test_malformed_toml() {
        let err = CatalogConfig::from_toml_str("[pricing\nmarkup = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file_rebases_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
            [images]
            root = "photos"

            [output]
            report = "/abs/report.csv"
            "#,
        )
        .unwrap();

        let config = CatalogConfig::from_file(&path).unwrap();
        assert_eq!(config.images.root, tmp.path().join("photos"));
        assert_eq!(config.output.report, PathBuf::from("/abs/report.csv"));
        assert_eq!(
            config.dimension_table.path,
            Some(tmp.path().join("data/dimensions_master.xlsx"))
        );
    }

    #[test]
    fn test_load_without_file_is_default() {
        let config = CatalogConfig::load(None).unwrap();
        assert_eq!(config.images.root, PathBuf::from("public/products"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(CatalogConfig::load(Some(Path::new("/nonexistent/catalog.toml"))).is_err());
    }

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_invalid_markup_rejected() {
        let mut config = CatalogConfig::default();
        config.pricing.markup = 0.8;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_new_every_rejected() {
        let mut config = CatalogConfig::default();
        config.storefront.new_every = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timestamps_parse() {
        let store = StorefrontConfig::default();
        assert_eq!(store.created_at().unwrap().to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let mut config = CatalogConfig::default();
        config.storefront.updated_at = "last tuesday".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("last tuesday"));
    }

    #[test]
    fn test_builders_override() {
        let config = CatalogConfig::default()
            .with_image_root("/srv/img")
            .with_url_prefix("")
            .with_dimension_table(None);
        assert_eq!(config.images.root, PathBuf::from("/srv/img"));
        assert_eq!(config.images.url_prefix, "");
        assert!(config.dimension_table.path.is_none());
    }
}
