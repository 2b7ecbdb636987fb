use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use skumatch_core::config::CatalogConfig;
use skumatch_core::domain::ImageRecord;
use skumatch_core::index::ImageIndex;
use skumatch_core::scanner;

/// Folders with the most images, largest first; ties keep walk order.
pub(crate) fn largest_folders(index: &ImageIndex, n: usize) -> Vec<(&str, usize)> {
    let mut folders: Vec<(&str, usize)> = index
        .folders()
        .iter()
        .map(|f| (f.name.as_str(), f.ordinals.len()))
        .collect();
    folders.sort_by(|a, b| b.1.cmp(&a.1));
    folders.truncate(n);
    folders
}

/// Image count per format name.
pub(crate) fn format_counts(records: &[ImageRecord]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.format.as_str()).or_insert(0) += 1;
    }
    counts
}

pub fn run(config: &CatalogConfig, root: PathBuf, top: usize) -> Result<()> {
    let records = scanner::scan_directory(&root, &config.images.url_prefix)?;
    let index = ImageIndex::build(records);

    println!();
    println!("  Image Index: {}", root.display());
    println!("  ====================");
    println!();
    println!(
        "   Images:     {:>8}        Full-stem keys:  {:>8}",
        index.len(),
        index.full_stem().len()
    );
    println!(
        "   Keys:       {:>8}        Two-part keys:   {:>8}",
        index.key_count(),
        index.two_part().len()
    );
    println!(
        "   Folders:    {:>8}        Three-part keys: {:>8}",
        index.folders().len(),
        index.three_part().len()
    );

    let formats = format_counts(index.records());
    if !formats.is_empty() {
        let summary: Vec<String> = formats.iter().map(|(f, n)| format!("{f} {n}")).collect();
        println!("   Formats:    {}", summary.join(", "));
    }

    let folders = largest_folders(&index, top);
    if !folders.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![Cell::new("Folder"), Cell::new("Images")]);
        for (name, count) in folders {
            table.add_row(vec![Cell::new(name), Cell::new(count)]);
        }
        println!();
        println!("  Largest Folders");
        println!("  ---------------");
        println!("{table}");
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skumatch_core::domain::ImageFormat;

    fn record(folder: &str, filename: &str, format: ImageFormat) -> ImageRecord {
        ImageRecord {
            url: format!("/products/{folder}/{filename}"),
            filename: filename.to_string(),
            folder_name: folder.to_string(),
            parent_folder_name: "products".to_string(),
            format,
        }
    }

    // ── largest_folders ─────────────────────────────────────────────

    #[test]
    fn test_largest_folders_sorted_and_truncated() {
        let index = ImageIndex::build(vec![
            record("aquila", "a.jpg", ImageFormat::Jpeg),
            record("carlem", "b.jpg", ImageFormat::Jpeg),
            record("carlem", "c.jpg", ImageFormat::Jpeg),
            record("xylo", "d.jpg", ImageFormat::Jpeg),
        ]);
        assert_eq!(largest_folders(&index, 2), vec![("carlem", 2), ("aquila", 1)]);
    }

    #[test]
    fn test_largest_folders_empty_index() {
        let index = ImageIndex::build(Vec::new());
        assert!(largest_folders(&index, 10).is_empty());
    }

    // ── format_counts ───────────────────────────────────────────────

    #[test]
    fn test_format_counts() {
        let records = vec![
            record("a", "1.jpg", ImageFormat::Jpeg),
            record("a", "2.webp", ImageFormat::WebP),
            record("a", "3.jpeg", ImageFormat::Jpeg),
        ];
        let counts = format_counts(&records);
        assert_eq!(counts.get("JPEG"), Some(&2));
        assert_eq!(counts.get("WebP"), Some(&1));
        assert_eq!(counts.get("PNG"), None);
    }
}
