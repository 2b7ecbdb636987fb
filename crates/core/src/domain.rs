use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Image file formats recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product photograph discovered under the image root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    /// Site-root-relative URL, always `/`-separated.
    pub url: String,
    pub filename: String,
    pub folder_name: String,
    pub parent_folder_name: String,
    pub format: ImageFormat,
}

/// One validated row of the SKU/alias table.
#[derive(Debug, Clone, PartialEq)]
pub struct SkuRow {
    pub sku: String,
    pub parent_sku: Option<String>,
    /// The parent ("MTP") product family name.
    pub parent_name: Option<String>,
    pub product_name: String,
    pub color: Option<String>,
    pub mrp: Option<f64>,
}

/// Physical dimensions of a parent SKU. `None` means the source had no usable value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DimensionRecord {
    pub length_cm: Option<u32>,
    pub width_cm: Option<u32>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<f64>,
}

impl DimensionRecord {
    /// Length, width and height, when all three are known.
    pub fn box_cm(&self) -> Option<(u32, u32, u32)> {
        Some((self.length_cm?, self.width_cm?, self.height_cm?))
    }

    /// Length/width/height as an output object, or `None` when all three are absent.
    pub fn to_product_dimensions(&self) -> Option<ProductDimensions> {
        if self.length_cm.is_none() && self.width_cm.is_none() && self.height_cm.is_none() {
            return None;
        }
        Some(ProductDimensions {
            length: self.length_cm,
            width: self.width_cm,
            height: self.height_cm,
        })
    }
}

/// Category metadata selected by SKU prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub category_id: &'static str,
    pub category_name: &'static str,
    pub product_type: &'static str,
}

/// A strategy in the image-matching fallback chain, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    /// The child SKU equals (or prefixes) an image filename stem.
    ExactChild,
    /// The parent/MTP SKU keys an image.
    Parent,
    /// The child SKU with its last segment dropped keys an image.
    TruncatedSku,
    /// Product-name tokens matched a folder name.
    FolderName,
}

impl MatchTier {
    pub const ALL: [MatchTier; 4] = [
        MatchTier::ExactChild,
        MatchTier::Parent,
        MatchTier::TruncatedSku,
        MatchTier::FolderName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactChild => "exact-child",
            Self::Parent => "parent",
            Self::TruncatedSku => "truncated-sku",
            Self::FolderName => "folder-name",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a SKU ended up with no real images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoMatchReason {
    /// No index key hit and no product name to fall back on.
    NoProductName,
    /// No index key hit and every name token was too short to score folders.
    NoUsableTokens,
    /// No index key hit and no folder name contained a name token.
    NoFolderMatch,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProductName => f.write_str("no SKU key in image index; no product name"),
            Self::NoUsableTokens => {
                f.write_str("no SKU key in image index; product name has no tokens over 3 chars")
            }
            Self::NoFolderMatch => {
                f.write_str("no SKU key in image index; no folder matches product name")
            }
        }
    }
}

/// Why a source row produced no product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MissingSku,
    MissingProductName,
    DuplicateSku(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSku => f.write_str("missing SKU code"),
            Self::MissingProductName => f.write_str("missing product name"),
            Self::DuplicateSku(sku) => write!(f, "duplicate SKU {sku}"),
        }
    }
}

/// Length/width/height block of an output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductDimensions {
    pub length: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    pub material: String,
    pub finish: String,
    pub style: String,
    pub color: String,
    pub dimensions: Option<ProductDimensions>,
    pub weight: Option<String>,
    pub care_instructions: Vec<String>,
    pub country_of_origin: String,
    pub warranty: String,
}

/// The assembled per-SKU catalog record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: String,
    pub category: String,
    pub product_type: String,
    pub brand: String,
    pub sku: String,
    pub parent_sku: Option<String>,
    pub price: u64,
    pub original_price: u64,
    pub discount_percentage: u32,
    pub color: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub has_real_images: bool,
    pub match_tiers: Vec<MatchTier>,
    pub dimensions: Option<ProductDimensions>,
    pub weight: Option<f64>,
    pub rating: f64,
    pub review_count: u32,
    pub stock: u32,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub tags: Vec<String>,
    pub material: String,
    pub finish: String,
    pub specifications: Specifications,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A diagnostics row for a product that fell back to the placeholder image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedProduct {
    #[serde(rename = "Product Name")]
    pub name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Parent SKU")]
    pub parent_sku: Option<String>,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Reason")]
    pub reason: String,
}

/// A source row that was dropped, with the 1-based data row number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}
