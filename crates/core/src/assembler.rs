use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::category::classify;
use crate::config::{CatalogConfig, PricingConfig, SkuColumns, StorefrontConfig};
use crate::dimensions::DimensionTable;
use crate::domain::{
    DimensionRecord, MatchTier, ResolvedProduct, SkipReason, SkippedRow, SkuRow,
    Specifications, UnmatchedProduct,
};
use crate::error::Result;
use crate::hasher;
use crate::index::ImageIndex;
use crate::matching::{resolve_images, ImageQuery, Resolution};
use crate::tables::{RawSkuRow, RowVerdict};

/// Rows that survived validation plus those that did not.
#[derive(Debug, Default)]
pub struct ValidatedRows {
    pub rows: Vec<SkuRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Validate raw rows in table order.
///
/// Blank required fields and repeated SKUs (compared case-insensitively,
/// first occurrence wins) are skipped. A corrupt required cell aborts.
pub fn validate_rows(raw: &[RawSkuRow], columns: &SkuColumns) -> Result<ValidatedRows> {
    let mut out = ValidatedRows::default();
    let mut seen = HashSet::new();

    for row in raw {
        match row.validate(columns) {
            RowVerdict::Valid(valid) => {
                if seen.insert(valid.sku.to_uppercase()) {
                    out.rows.push(valid);
                } else {
                    debug!(row = row.row, sku = %valid.sku, "skipping duplicate SKU");
                    out.skipped.push(SkippedRow {
                        row: row.row,
                        reason: SkipReason::DuplicateSku(valid.sku),
                    });
                }
            }
            RowVerdict::Skip(reason) => {
                debug!(row = row.row, %reason, "skipping row");
                out.skipped.push(SkippedRow { row: row.row, reason });
            }
            RowVerdict::Fatal(err) => return Err(err),
        }
    }

    Ok(out)
}

/// Products in output order plus everything the run wants to report.
#[derive(Debug, Default)]
pub struct Assembly {
    /// Products with real images first, then placeholder products, each
    /// group in source order.
    pub products: Vec<ResolvedProduct>,
    pub unmatched: Vec<UnmatchedProduct>,
    /// Products each tier contributed at least one image to.
    pub tier_counts: BTreeMap<MatchTier, usize>,
}

impl Assembly {
    pub fn matched_count(&self) -> usize {
        self.products.iter().filter(|p| p.has_real_images).count()
    }
}

/// Turns validated rows into storefront products against read-only lookups.
pub struct ProductAssembler<'a> {
    index: &'a ImageIndex,
    dimensions: &'a DimensionTable,
    pricing: &'a PricingConfig,
    storefront: &'a StorefrontConfig,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> ProductAssembler<'a> {
    pub fn new(
        config: &'a CatalogConfig,
        index: &'a ImageIndex,
        dimensions: &'a DimensionTable,
    ) -> Result<Self> {
        Ok(Self {
            index,
            dimensions,
            pricing: &config.pricing,
            storefront: &config.storefront,
            created_at: config.storefront.created_at()?,
            updated_at: config.storefront.updated_at()?,
        })
    }

    /// Resolve and assemble every row.
    ///
    /// Resolution runs in parallel; ids, ordering and diagnostics depend
    /// only on the input order.
    pub fn assemble(&self, rows: &[SkuRow]) -> Assembly {
        let built: Vec<(ResolvedProduct, Resolution)> = rows
            .par_iter()
            .enumerate()
            .map(|(i, row)| self.assemble_one(i + 1, row))
            .collect();

        let mut tier_counts = BTreeMap::new();
        let mut unmatched = Vec::new();
        let mut products = Vec::with_capacity(built.len());

        for (product, resolution) in built {
            for tier in &resolution.tiers {
                *tier_counts.entry(*tier).or_insert(0) += 1;
            }
            if !product.has_real_images {
                let reason = resolution
                    .miss_reason
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                unmatched.push(UnmatchedProduct {
                    name: product.name.clone(),
                    sku: product.sku.clone(),
                    parent_sku: product.parent_sku.clone(),
                    color: product.color.clone(),
                    category: product.category.clone(),
                    reason,
                });
            }
            products.push(product);
        }

        let products = partition_by_images(products);

        info!(
            products = products.len(),
            unmatched = unmatched.len(),
            "assembled catalog"
        );

        Assembly {
            products,
            unmatched,
            tier_counts,
        }
    }

    /// Build one product. `ordinal` is the 1-based position among valid rows.
    pub fn assemble_one(&self, ordinal: usize, row: &SkuRow) -> (ResolvedProduct, Resolution) {
        let store = self.storefront;
        let category = classify(&row.sku);
        let dims = row
            .parent_sku
            .as_deref()
            .and_then(|p| self.dimensions.get(p))
            .copied()
            .unwrap_or_default();

        // Folder matching works best on the family name
        let folder_name = row.parent_name.as_deref().or(Some(row.product_name.as_str()));
        let query = ImageQuery {
            sku: &row.sku,
            parent_sku: row.parent_sku.as_deref(),
            product_name: folder_name,
            color: row.color.as_deref(),
        };
        let resolution = resolve_images(&query, self.index);

        let has_real_images = resolution.is_matched();
        let images = if has_real_images {
            resolution.urls.clone()
        } else {
            vec![store.placeholder_image.clone()]
        };

        let color = row
            .color
            .clone()
            .unwrap_or_else(|| store.default_color.clone());
        let price = price_for(row.mrp, self.pricing.default_price);
        let digest = hasher::sku_digest(&row.sku);
        let dimensions = dims.to_product_dimensions();

        let product = ResolvedProduct {
            id: format!("prod-{ordinal}"),
            name: branded_name(&store.brand, &row.product_name),
            slug: slugify(&row.product_name),
            description: describe(&store.brand, &row.product_name, &color, &dims),
            category_id: category.category_id.to_string(),
            category: category.category_name.to_string(),
            product_type: category.product_type.to_string(),
            brand: store.brand.clone(),
            sku: row.sku.clone(),
            parent_sku: row.parent_sku.clone(),
            price,
            original_price: (price as f64 * self.pricing.markup).floor() as u64,
            discount_percentage: discount_percentage(self.pricing.markup),
            color: color.clone(),
            colors: vec![color.clone()],
            sizes: vec!["Standard".to_string()],
            thumbnail: images[0].clone(),
            images,
            has_real_images,
            match_tiers: resolution.tiers.clone(),
            dimensions,
            weight: dims.weight_kg,
            rating: hasher::rating(digest),
            review_count: hasher::review_count(digest),
            stock: hasher::stock(digest),
            is_active: true,
            is_featured: ordinal <= store.featured_count,
            is_new: ordinal % store.new_every.max(1) == 0,
            tags: vec![
                category.category_name.to_string(),
                store.brand.clone(),
                store.material.clone(),
            ],
            material: store.material.clone(),
            finish: store.finish.clone(),
            specifications: Specifications {
                material: store.material.clone(),
                finish: store.finish.clone(),
                style: store.style.clone(),
                color,
                dimensions,
                weight: dims.weight_kg.map(|w| format!("{w} kg")),
                care_instructions: store.care_instructions.clone(),
                country_of_origin: store.country_of_origin.clone(),
                warranty: store.warranty.clone(),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        (product, resolution)
    }
}

/// Stable partition: products with real images first.
pub fn partition_by_images(products: Vec<ResolvedProduct>) -> Vec<ResolvedProduct> {
    let (mut matched, placeholders): (Vec<_>, Vec<_>) =
        products.into_iter().partition(|p| p.has_real_images);
    matched.extend(placeholders);
    matched
}

/// MRP truncated to whole currency units, or the default when it is
/// missing or not positive.
pub fn price_for(mrp: Option<f64>, default_price: u64) -> u64 {
    mrp.filter(|m| m.is_finite() && *m >= 1.0)
        .map(|m| m.trunc() as u64)
        .unwrap_or(default_price)
}

/// Discount implied by the markup, in whole percent.
pub fn discount_percentage(markup: f64) -> u32 {
    if markup <= 1.0 {
        return 0;
    }
    ((1.0 - 1.0 / markup) * 100.0).round() as u32
}

/// Prefix the brand unless the name already mentions it.
pub fn branded_name(brand: &str, name: &str) -> String {
    if name.contains(brand) {
        name.to_string()
    } else {
        format!("{brand} {name}")
    }
}

/// URL slug: lowercase, punctuation dropped, runs of whitespace, `_` and
/// `-` collapsed to a single `-`.
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_separator = false;
    for c in kept.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        } else {
            slug.push(c);
            in_separator = false;
        }
    }
    slug
}

fn describe(brand: &str, name: &str, color: &str, dims: &DimensionRecord) -> String {
    let mut text = format!(
        "Premium {brand} {name} in {color}. Crafted with high-quality engineered wood."
    );
    if let Some((l, w, h)) = dims.box_cm() {
        text.push_str(&format!(
            "\n\n**Dimensions:** {l}cm (L) × {w}cm (W) × {h}cm (H)"
        ));
    }
    text
}
