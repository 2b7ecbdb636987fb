use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::{ResolvedProduct, UnmatchedProduct};
use crate::error::{Error, Result};

const REPORT_HEADER: [&str; 6] = ["Product Name", "SKU", "Parent SKU", "Color", "Category", "Reason"];

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the products as a pretty-printed JSON array.
pub fn write_products(path: &Path, products: &[ResolvedProduct]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, products)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), products = products.len(), "wrote products");
    Ok(())
}

/// Write the unmatched-products report. The header row is written even
/// when every product matched.
pub fn write_report(path: &Path, unmatched: &[UnmatchedProduct]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(REPORT_HEADER)?;
    for row in unmatched {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = unmatched.len(), "wrote unmatched report");
    Ok(())
}

/// Sibling path a file is written to before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the product JSON and the unmatched report as a pair.
///
/// Both files are staged next to their targets and only renamed into place
/// once both are written, so a failure leaves the previous outputs untouched.
/// The report is renamed first; if that rename fails the products file is
/// not replaced either.
pub fn write_outputs(
    products_path: &Path,
    report_path: &Path,
    products: &[ResolvedProduct],
    unmatched: &[UnmatchedProduct],
) -> Result<()> {
    let products_tmp = staging_path(products_path);
    let report_tmp = staging_path(report_path);

    let staged = write_products(&products_tmp, products)
        .and_then(|()| write_report(&report_tmp, unmatched))
        .and_then(|()| fs::rename(&report_tmp, report_path).map_err(Error::from))
        .and_then(|()| fs::rename(&products_tmp, products_path).map_err(Error::from));

    if staged.is_err() {
        for tmp in [&products_tmp, &report_tmp] {
            if tmp.exists() {
                if let Err(err) = fs::remove_file(tmp) {
                    warn!(path = %tmp.display(), error = %err, "failed to remove staged output");
                }
            }
        }
    }
    staged
}
