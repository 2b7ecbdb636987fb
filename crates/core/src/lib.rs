pub mod assembler;
pub mod category;
pub mod config;
pub mod dimensions;
pub mod domain;
pub mod error;
pub mod hasher;
pub mod index;
pub mod matching;
pub mod output;
pub mod scanner;
pub mod sheet;
pub mod tables;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use assembler::{validate_rows, ProductAssembler};
use config::{CatalogConfig, OutputConfig};
use dimensions::DimensionTable;
use domain::*;
use error::Result;
use index::ImageIndex;
use tables::RawSkuRow;

/// Callback events for reporting build progress.
pub enum BuildProgress {
    /// Starting to walk the image root.
    IndexStart { root: String },
    /// The image index is ready.
    IndexComplete {
        images: usize,
        keys: usize,
        folders: usize,
    },
    /// Rows validated and about to be resolved.
    RowsLoaded { count: usize },
    /// One product is final, in output order.
    ProductResolved { sku: String, matched: bool },
    /// A pipeline phase completed.
    PhaseComplete { phase: String },
}

/// Counts describing one build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSummary {
    pub rows_read: usize,
    pub products: usize,
    pub with_images: usize,
    pub skipped: Vec<SkippedRow>,
    pub tier_counts: BTreeMap<MatchTier, usize>,
    pub images: usize,
    pub keys: usize,
    pub folders: usize,
    pub dimension_entries: usize,
}

impl CatalogSummary {
    pub fn without_images(&self) -> usize {
        self.products - self.with_images
    }

    /// Share of products with real images, in whole percent.
    pub fn coverage_percent(&self) -> usize {
        if self.products == 0 {
            0
        } else {
            self.with_images * 100 / self.products
        }
    }
}

/// Everything a build produces; nothing is written until [`CatalogOutput::write`].
#[derive(Debug, Default)]
pub struct CatalogOutput {
    pub products: Vec<ResolvedProduct>,
    pub unmatched: Vec<UnmatchedProduct>,
    pub summary: CatalogSummary,
}

impl CatalogOutput {
    /// Write the product JSON and the unmatched report. Both are staged
    /// first, so a failed write leaves the previous files in place.
    pub fn write(&self, paths: &OutputConfig) -> Result<()> {
        output::write_outputs(&paths.products, &paths.report, &self.products, &self.unmatched)
    }
}

/// The main entry point: builds a storefront catalog from the SKU table,
/// the dimensions table and the image tree.
pub struct Catalog {
    config: CatalogConfig,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Walk the image root and index every photograph.
    pub fn build_index(&self) -> Result<ImageIndex> {
        let images = &self.config.images;
        let records = scanner::scan_directory(&images.root, &images.url_prefix)?;
        Ok(ImageIndex::build(records))
    }

    /// Load the dimensions table, or an empty one when none is configured.
    pub fn load_dimensions(&self) -> Result<DimensionTable> {
        let table_config = &self.config.dimension_table;
        let Some(path) = table_config.path.as_deref() else {
            info!("no dimensions table configured");
            return Ok(DimensionTable::default());
        };
        let table = sheet::read_table(path, table_config.sheet.as_deref(), table_config.header_row)?;
        let rows = tables::dimension_rows(&table, &table_config.columns)?;
        let dims = DimensionTable::from_rows(rows);
        info!(path = %path.display(), entries = dims.len(), "loaded dimensions");
        Ok(dims)
    }

    /// Read the SKU/alias table without validating rows.
    pub fn load_sku_rows(&self) -> Result<Vec<RawSkuRow>> {
        let table_config = &self.config.sku_table;
        let table = sheet::read_table(
            &table_config.path,
            table_config.sheet.as_deref(),
            table_config.header_row,
        )?;
        let rows = tables::sku_rows(&table, &table_config.columns)?;
        info!(path = %table.path().display(), rows = rows.len(), "loaded SKU table");
        Ok(rows)
    }

    /// Run the whole pipeline. Any run-level failure returns before
    /// anything is written.
    pub fn build(
        &self,
        mut progress_cb: Option<&mut dyn FnMut(BuildProgress)>,
    ) -> Result<CatalogOutput> {
        let raw_rows = self.load_sku_rows()?;
        let dims = self.load_dimensions()?;

        if let Some(ref mut cb) = progress_cb {
            cb(BuildProgress::IndexStart {
                root: self.config.images.root.to_string_lossy().to_string(),
            });
        }

        let index = self.build_index()?;

        if let Some(ref mut cb) = progress_cb {
            cb(BuildProgress::IndexComplete {
                images: index.len(),
                keys: index.key_count(),
                folders: index.folders().len(),
            });
            cb(BuildProgress::PhaseComplete {
                phase: "indexing".to_string(),
            });
        }

        let validated = validate_rows(&raw_rows, &self.config.sku_table.columns)?;

        if let Some(ref mut cb) = progress_cb {
            cb(BuildProgress::RowsLoaded {
                count: validated.rows.len(),
            });
        }

        let assembler = ProductAssembler::new(&self.config, &index, &dims)?;
        let assembly = assembler.assemble(&validated.rows);

        // Report sequentially (callback is not Send)
        if let Some(ref mut cb) = progress_cb {
            for product in &assembly.products {
                cb(BuildProgress::ProductResolved {
                    sku: product.sku.clone(),
                    matched: product.has_real_images,
                });
            }
            cb(BuildProgress::PhaseComplete {
                phase: "assembly".to_string(),
            });
        }

        let summary = CatalogSummary {
            rows_read: raw_rows.len(),
            products: assembly.products.len(),
            with_images: assembly.matched_count(),
            skipped: validated.skipped,
            tier_counts: assembly.tier_counts,
            images: index.len(),
            keys: index.key_count(),
            folders: index.folders().len(),
            dimension_entries: dims.len(),
        };

        info!(
            products = summary.products,
            with_images = summary.with_images,
            skipped = summary.skipped.len(),
            "catalog built"
        );

        Ok(CatalogOutput {
            products: assembly.products,
            unmatched: assembly.unmatched,
            summary,
        })
    }
}
