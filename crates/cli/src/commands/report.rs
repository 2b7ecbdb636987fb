use std::collections::BTreeMap;

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use skumatch_core::domain::{MatchTier, SkipReason, SkippedRow, UnmatchedProduct};
use skumatch_core::CatalogSummary;

/// Skipped rows grouped by kind, in a fixed display order.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct SkipCounts {
    pub(crate) missing_sku: usize,
    pub(crate) missing_name: usize,
    pub(crate) duplicates: usize,
}

impl SkipCounts {
    pub(crate) fn from_rows(rows: &[SkippedRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.reason {
                SkipReason::MissingSku => counts.missing_sku += 1,
                SkipReason::MissingProductName => counts.missing_name += 1,
                SkipReason::DuplicateSku(_) => counts.duplicates += 1,
            }
        }
        counts
    }

    pub(crate) fn total(&self) -> usize {
        self.missing_sku + self.missing_name + self.duplicates
    }
}

/// `part` as a share of `whole`, one decimal.
pub(crate) fn format_percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "—".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.iter().map(|h| Cell::new(*h)).collect::<Vec<_>>());
    table
}

/// Per-tier hit counts, every tier listed even when it never fired.
pub(crate) fn tier_rows(counts: &BTreeMap<MatchTier, usize>) -> Vec<(MatchTier, usize)> {
    MatchTier::ALL
        .iter()
        .map(|t| (*t, counts.get(t).copied().unwrap_or(0)))
        .collect()
}

pub(crate) fn print_summary(summary: &CatalogSummary) {
    let skips = SkipCounts::from_rows(&summary.skipped);

    println!();
    println!("  Catalog Summary");
    println!("  ===============");
    println!();
    println!(
        "   Rows read:  {:>8}        Images:      {:>8}",
        summary.rows_read, summary.images
    );
    println!(
        "   Products:   {:>8}        Index keys:  {:>8}",
        summary.products, summary.keys
    );
    println!(
        "   Matched:    {:>8}        Folders:     {:>8}",
        summary.with_images, summary.folders
    );
    println!(
        "   Coverage:   {:>8}        Dimensions:  {:>8}",
        format_percent(summary.with_images, summary.products),
        summary.dimension_entries
    );

    let mut tiers = new_table(&["Tier", "Products", "Share"]);
    for (tier, count) in tier_rows(&summary.tier_counts) {
        tiers.add_row(vec![
            Cell::new(tier.as_str()),
            Cell::new(count),
            Cell::new(format_percent(count, summary.products)),
        ]);
    }
    println!();
    println!("  Match Tiers");
    println!("  -----------");
    println!("{tiers}");

    if skips.total() > 0 {
        let mut skipped = new_table(&["Reason", "Rows"]);
        for (label, count) in [
            ("missing SKU code", skips.missing_sku),
            ("missing product name", skips.missing_name),
            ("duplicate SKU", skips.duplicates),
        ] {
            if count > 0 {
                skipped.add_row(vec![Cell::new(label), Cell::new(count).fg(Color::Yellow)]);
            }
        }
        println!();
        println!("  Skipped Rows");
        println!("  ------------");
        println!("{skipped}");
    }
}

pub(crate) fn print_unmatched(unmatched: &[UnmatchedProduct]) {
    if unmatched.is_empty() {
        println!();
        println!("  Every product has real images.");
        return;
    }

    let mut table = new_table(&["SKU", "Parent", "Product", "Category", "Reason"]);
    for row in unmatched {
        table.add_row(vec![
            Cell::new(&row.sku),
            Cell::new(row.parent_sku.as_deref().unwrap_or("\u{2014}")).fg(Color::DarkGrey),
            Cell::new(truncate(&row.name, 40)),
            Cell::new(&row.category),
            Cell::new(&row.reason).fg(Color::Yellow),
        ]);
    }

    println!();
    println!("  Unmatched Products ({})", unmatched.len());
    println!("  ------------------");
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_percent ──────────────────────────────────────────────

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(3, 4), "75.0%");
        assert_eq!(format_percent(1, 3), "33.3%");
        assert_eq!(format_percent(0, 10), "0.0%");
    }

    #[test]
    fn test_format_percent_empty_whole() {
        assert_eq!(format_percent(0, 0), "—");
    }

    // ── truncate ────────────────────────────────────────────────────

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("Carlem", 10), "Carlem");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("Bluewud Carlem Shoe Rack", 10), "Bluewud C…");
        assert_eq!(truncate("Bluewud Carlem Shoe Rack", 10).chars().count(), 10);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("été café", 4), "été…");
    }

    // ── SkipCounts ──────────────────────────────────────────────────

    #[test]
    fn test_skip_counts() {
        let rows = vec![
            SkippedRow { row: 1, reason: SkipReason::MissingSku },
            SkippedRow { row: 2, reason: SkipReason::DuplicateSku("A".into()) },
            SkippedRow { row: 5, reason: SkipReason::DuplicateSku("B".into()) },
        ];
        let counts = SkipCounts::from_rows(&rows);
        assert_eq!(
            counts,
            SkipCounts {
                missing_sku: 1,
                missing_name: 0,
                duplicates: 2,
            }
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_skip_counts_empty() {
        assert_eq!(SkipCounts::from_rows(&[]).total(), 0);
    }

    // ── tier_rows ───────────────────────────────────────────────────

    #[test]
    fn test_tier_rows_lists_every_tier() {
        let mut counts = BTreeMap::new();
        counts.insert(MatchTier::Parent, 4);
        let rows = tier_rows(&counts);
        assert_eq!(
            rows,
            vec![
                (MatchTier::ExactChild, 0),
                (MatchTier::Parent, 4),
                (MatchTier::TruncatedSku, 0),
                (MatchTier::FolderName, 0),
            ]
        );
    }
}
