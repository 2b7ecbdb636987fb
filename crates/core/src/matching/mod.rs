pub mod folder;

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{MatchTier, NoMatchReason};
use crate::index::ImageIndex;
use folder::{color_needles, name_tokens, rank_folders, url_matches_color, FOLDER_FALLBACK_LIMIT};

/// Upper bound on images attached to one product.
pub const MAX_IMAGES: usize = 8;

/// What is known about a SKU when searching for its photographs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageQuery<'a> {
    pub sku: &'a str,
    pub parent_sku: Option<&'a str>,
    pub product_name: Option<&'a str>,
    pub color: Option<&'a str>,
}

/// Images found for a SKU and the tiers that contributed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// At most [`MAX_IMAGES`] distinct URLs; the first is the thumbnail.
    pub urls: Vec<String>,
    /// Tiers that added at least one URL, in the order they ran.
    pub tiers: Vec<MatchTier>,
    /// Set only when `urls` is empty.
    pub miss_reason: Option<NoMatchReason>,
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        !self.urls.is_empty()
    }
}

/// Ordered, duplicate-free, capped URL accumulator.
struct Collector {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl Collector {
    fn new() -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.urls.len() >= MAX_IMAGES
    }

    /// Append unseen URLs until the cap; returns how many were added.
    fn extend<'u, I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = &'u str>,
    {
        let mut added = 0;
        for url in urls {
            if self.is_full() {
                break;
            }
            if self.seen.insert(url.to_string()) {
                self.urls.push(url.to_string());
                added += 1;
            }
        }
        added
    }
}

/// Find the photographs for one SKU.
///
/// Tiers run in order:
/// 1. the child SKU as an index key,
/// 2. the parent SKU as an index key,
/// 3. the child SKU minus its last hyphen segment as an index key,
/// 4. only when 1–3 found nothing: folders whose name contains product-name
///    tokens, filtered by color when the folder has color-matching images.
///
/// Tiers 1–3 accumulate; each adds only URLs not already collected.
pub fn resolve_images(query: &ImageQuery<'_>, index: &ImageIndex) -> Resolution {
    let mut collected = Collector::new();
    let mut tiers = Vec::new();

    let sku = query.sku.trim().to_uppercase();

    // Tier 1: exact child SKU
    if collected.extend(index.lookup(&sku)) > 0 {
        tiers.push(MatchTier::ExactChild);
    }

    // Tier 2: parent / MTP SKU
    if let Some(parent) = query.parent_sku.map(str::trim).filter(|p| !p.is_empty()) {
        if collected.extend(index.lookup(parent)) > 0 {
            tiers.push(MatchTier::Parent);
        }
    }

    // Tier 3: child SKU with the last segment dropped
    let parts: Vec<&str> = sku.split('-').collect();
    if parts.len() >= 2 {
        let inferred_parent = parts[..parts.len() - 1].join("-");
        if collected.extend(index.lookup(&inferred_parent)) > 0 {
            tiers.push(MatchTier::TruncatedSku);
        }
    }

    if !collected.urls.is_empty() {
        debug!(sku = %sku, tiers = ?tiers, images = collected.urls.len(), "resolved by SKU key");
        return Resolution {
            urls: collected.urls,
            tiers,
            miss_reason: None,
        };
    }

    // Tier 4: folder name fallback
    let miss_reason = match resolve_by_folder(query, index, &mut collected) {
        Ok(()) => {
            tiers.push(MatchTier::FolderName);
            None
        }
        Err(reason) => Some(reason),
    };

    debug!(
        sku = %sku,
        images = collected.urls.len(),
        reason = ?miss_reason,
        "folder fallback finished"
    );

    Resolution {
        urls: collected.urls,
        tiers,
        miss_reason,
    }
}

fn resolve_by_folder(
    query: &ImageQuery<'_>,
    index: &ImageIndex,
    collected: &mut Collector,
) -> Result<(), NoMatchReason> {
    let name = query
        .product_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(NoMatchReason::NoProductName)?;

    let tokens = name_tokens(name);
    if tokens.is_empty() {
        return Err(NoMatchReason::NoUsableTokens);
    }

    let candidates = rank_folders(index, &tokens);
    if candidates.is_empty() {
        return Err(NoMatchReason::NoFolderMatch);
    }

    let needles = color_needles(query.color);

    for (folder, _score) in candidates {
        if collected.is_full() {
            break;
        }
        let folder_urls = index.urls_of(&folder.ordinals);

        if let Some(ref needles) = needles {
            let color_matches: Vec<&str> = folder_urls
                .iter()
                .copied()
                .filter(|url| url_matches_color(url, needles))
                .collect();
            if !color_matches.is_empty() {
                collected.extend(color_matches);
                continue;
            }
        }

        collected.extend(folder_urls.into_iter().take(FOLDER_FALLBACK_LIMIT));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImageFormat, ImageRecord};

    fn record(folder: &str, filename: &str) -> ImageRecord {
        ImageRecord {
            url: format!("/products/{folder}/{filename}"),
            filename: filename.to_string(),
            folder_name: folder.to_string(),
            parent_folder_name: "products".to_string(),
            format: ImageFormat::Jpeg,
        }
    }

    fn index(records: &[(&str, &str)]) -> ImageIndex {
        ImageIndex::build(records.iter().map(|(d, f)| record(d, f)).collect())
    }

    fn query(sku: &str) -> ImageQuery<'_> {
        ImageQuery {
            sku,
            ..ImageQuery::default()
        }
    }

    fn assert_distinct(urls: &[String]) {
        let set: HashSet<&String> = urls.iter().collect();
        assert_eq!(set.len(), urls.len(), "duplicate URL in {urls:?}");
    }

    // ── Tier 1: exact child ─────────────────────────────────────

    #[test]
    fn test_exact_child_match() {
        let idx = index(&[("carlem", "sr-cle-mf.jpg"), ("carlem", "sr-cle-w.jpg")]);
        let res = resolve_images(&query("SR-CLE-MF"), &idx);

        assert_eq!(res.urls[0], "/products/carlem/sr-cle-mf.jpg");
        assert_eq!(res.tiers[0], MatchTier::ExactChild);
    }

    #[test]
    fn test_exact_child_single_image() {
        let idx = index(&[("carlem", "sr-cle-mf.jpg")]);
        let res = resolve_images(&query("sr-cle-mf"), &idx);

        assert_eq!(res.urls, vec!["/products/carlem/sr-cle-mf.jpg"]);
        assert_eq!(res.tiers, vec![MatchTier::ExactChild]);
        assert!(res.miss_reason.is_none());
    }

    #[test]
    fn test_exact_child_via_three_part_prefix() {
        // "SR-CLE-MF-2" registers under three-part key SR-CLE-MF
        let idx = index(&[("carlem", "sr-cle-mf-2.jpg")]);
        let res = resolve_images(&query("SR-CLE-MF"), &idx);
        assert_eq!(res.tiers, vec![MatchTier::ExactChild]);
    }

    // ── Tier 2: parent ──────────────────────────────────────────

    #[test]
    fn test_parent_match_when_no_child_images() {
        let idx = index(&[("aq", "bt-aq-front.jpg")]);
        let q = ImageQuery {
            sku: "BT-AQ-W",
            parent_sku: Some("BT-AQ"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls, vec!["/products/aq/bt-aq-front.jpg"]);
        assert_eq!(res.tiers, vec![MatchTier::Parent]);
    }

    #[test]
    fn test_child_then_parent_accumulate() {
        let idx = index(&[
            ("aq", "bt-aq-front.jpg"),
            ("aq", "bt-aq-side.jpg"),
            ("aq", "bt-aq-w.jpg"),
        ]);
        let q = ImageQuery {
            sku: "BT-AQ-W",
            parent_sku: Some("bt-aq"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(
            res.urls,
            vec![
                "/products/aq/bt-aq-w.jpg",
                "/products/aq/bt-aq-front.jpg",
                "/products/aq/bt-aq-side.jpg",
            ]
        );
        assert_eq!(res.tiers, vec![MatchTier::ExactChild, MatchTier::Parent]);
    }

    #[test]
    fn test_blank_parent_ignored() {
        let idx = index(&[("aq", "bt-aq-front.jpg")]);
        let q = ImageQuery {
            sku: "ZZ-1",
            parent_sku: Some("   "),
            ..ImageQuery::default()
        };
        assert!(!resolve_images(&q, &idx).is_matched());
    }

    // ── Tier 3: truncated SKU ───────────────────────────────────

    #[test]
    fn test_truncated_sku_recovers_missing_parent() {
        let idx = index(&[("carlem", "sr-cle-1.jpg"), ("carlem", "sr-cle-2.jpg")]);
        let res = resolve_images(&query("SR-CLE-MF"), &idx);

        assert_eq!(res.urls.len(), 2);
        assert_eq!(res.tiers, vec![MatchTier::TruncatedSku]);
    }

    #[test]
    fn test_truncated_sku_skips_parent_duplicates() {
        let idx = index(&[("carlem", "sr-cle-1.jpg")]);
        let q = ImageQuery {
            sku: "SR-CLE-MF",
            parent_sku: Some("SR-CLE"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls.len(), 1);
        assert_eq!(res.tiers, vec![MatchTier::Parent]);
    }

    #[test]
    fn test_single_part_sku_has_no_truncation() {
        let idx = index(&[("misc", "sofa.jpg")]);
        assert!(!resolve_images(&query("SOFA"), &idx).tiers.contains(&MatchTier::TruncatedSku));
    }

    // ── Tier 4: folder fallback ─────────────────────────────────

    #[test]
    fn test_folder_match_filters_by_color() {
        let idx = index(&[("xylo", "xylo-walnut-1.jpg"), ("xylo", "xylo-white-1.jpg")]);
        let q = ImageQuery {
            sku: "CT-XY-Z",
            parent_sku: None,
            product_name: Some("Xylo Coffee Table"),
            color: Some("Walnut"),
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls, vec!["/products/xylo/xylo-walnut-1.jpg"]);
        assert_eq!(res.tiers, vec![MatchTier::FolderName]);
    }

    #[test]
    fn test_folder_match_without_color_hit_takes_first_five() {
        let files: Vec<(&str, String)> = (1..=7).map(|i| ("xylo", format!("shot-{i}.jpg"))).collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(d, f)| (*d, f.as_str())).collect();
        let idx = index(&refs);
        let q = ImageQuery {
            sku: "CT-XY-Z",
            product_name: Some("Xylo Coffee Table"),
            color: Some("Wenge"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls.len(), FOLDER_FALLBACK_LIMIT);
        assert_eq!(res.urls[0], "/products/xylo/shot-1.jpg");
        assert_eq!(res.urls[4], "/products/xylo/shot-5.jpg");
    }

    #[test]
    fn test_folder_match_accumulates_across_folders_until_cap() {
        let mut files = Vec::new();
        for folder in ["xylo table", "xylo"] {
            for i in 1..=5 {
                files.push((folder, format!("img-{i}.jpg")));
            }
        }
        let refs: Vec<(&str, &str)> = files.iter().map(|(d, f)| (*d, f.as_str())).collect();
        let idx = index(&refs);
        let q = ImageQuery {
            sku: "CT-XY-Z",
            product_name: Some("Xylo Coffee Table"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls.len(), MAX_IMAGES);
        // Higher-scoring folder first
        assert!(res.urls[..5].iter().all(|u| u.starts_with("/products/xylo table/")));
        assert!(res.urls[5..].iter().all(|u| u.starts_with("/products/xylo/")));
    }

    #[test]
    fn test_folder_fallback_not_used_when_key_matched() {
        let idx = index(&[("xylo", "ct-xy-z.jpg"), ("xylo", "xylo-walnut-1.jpg")]);
        let q = ImageQuery {
            sku: "CT-XY-Z",
            product_name: Some("Xylo Coffee Table"),
            color: Some("Walnut"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls, vec!["/products/xylo/ct-xy-z.jpg"]);
        assert!(!res.tiers.contains(&MatchTier::FolderName));
    }

    // ── Misses ──────────────────────────────────────────────────

    #[test]
    fn test_miss_reasons() {
        let idx = index(&[("xylo", "xylo-1.jpg")]);

        let res = resolve_images(&query("ZZ-1"), &idx);
        assert_eq!(res.miss_reason, Some(NoMatchReason::NoProductName));

        let q = ImageQuery {
            sku: "ZZ-1",
            product_name: Some("TV Set"),
            ..ImageQuery::default()
        };
        assert_eq!(resolve_images(&q, &idx).miss_reason, Some(NoMatchReason::NoUsableTokens));

        let q = ImageQuery {
            sku: "ZZ-1",
            product_name: Some("Carlem Shoe Rack"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);
        assert!(res.urls.is_empty());
        assert!(res.tiers.is_empty());
        assert_eq!(res.miss_reason, Some(NoMatchReason::NoFolderMatch));
    }

    #[test]
    fn test_empty_index_never_fails() {
        let idx = ImageIndex::build(Vec::new());
        let q = ImageQuery {
            sku: "SR-CLE-MF",
            parent_sku: Some("SR-CLE"),
            product_name: Some("Carlem Shoe Rack"),
            color: Some("White"),
        };
        assert!(!resolve_images(&q, &idx).is_matched());
    }

    // ── Output invariants ───────────────────────────────────────

    #[test]
    fn test_result_capped_and_distinct() {
        let files: Vec<String> = (1..=12).map(|i| format!("sr-cle-w-{i}.jpg")).collect();
        let mut refs: Vec<(&str, &str)> = files.iter().map(|f| ("carlem", f.as_str())).collect();
        refs.push(("carlem", "sr-cle-front.jpg"));
        let idx = index(&refs);
        let q = ImageQuery {
            sku: "SR-CLE-W",
            parent_sku: Some("SR-CLE"),
            ..ImageQuery::default()
        };
        let res = resolve_images(&q, &idx);

        assert_eq!(res.urls.len(), MAX_IMAGES);
        assert_distinct(&res.urls);
        // Parent tier was starved by the cap
        assert_eq!(res.tiers, vec![MatchTier::ExactChild]);
    }

    #[test]
    fn test_distinct_across_many_queries() {
        let idx = index(&[
            ("aq", "bt-aq.jpg"),
            ("aq", "bt-aq-w.jpg"),
            ("aq", "bt-aq-w-1.jpg"),
            ("aquila", "aquila-white.jpg"),
            ("aquila", "aquila-wenge.jpg"),
        ]);
        for (sku, parent, name, color) in [
            ("BT-AQ-W", Some("BT-AQ"), Some("Aquila Bedside"), Some("White")),
            ("BT-AQ", None, None, None),
            ("BT-ZZ-W", None, Some("Aquila Bedside"), Some("White")),
            ("BT-ZZ-W", None, Some("Aquila Bedside"), None),
        ] {
            let q = ImageQuery {
                sku,
                parent_sku: parent,
                product_name: name,
                color,
            };
            let res = resolve_images(&q, &idx);
            assert!(res.urls.len() <= MAX_IMAGES);
            assert_distinct(&res.urls);
        }
    }
}
