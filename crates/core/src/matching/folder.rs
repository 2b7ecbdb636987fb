use crate::index::{FolderEntry, ImageIndex};

/// Name tokens shorter than this many characters (inclusive) never score a folder.
pub const MIN_TOKEN_CHARS: usize = 3;

/// How many images a matched folder contributes when no color filter applies.
pub const FOLDER_FALLBACK_LIMIT: usize = 5;

/// Lowercased whitespace tokens of `name` that are long enough to score folders.
pub fn name_tokens(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Score every folder by how many tokens occur in its name and return the
/// folders with a positive score, best first. Equal scores keep walk order.
pub fn rank_folders<'a>(index: &'a ImageIndex, tokens: &[String]) -> Vec<(&'a FolderEntry, usize)> {
    let mut ranked: Vec<(&FolderEntry, usize)> = index
        .folders()
        .iter()
        .filter_map(|folder| {
            let score = tokens
                .iter()
                .filter(|t| folder.name.contains(t.as_str()))
                .count();
            (score > 0).then_some((folder, score))
        })
        .collect();

    // sort_by is stable, ties stay in walk order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Lowercased color plus its space-free form, or `None` for a blank color.
pub fn color_needles(color: Option<&str>) -> Option<(String, String)> {
    let lower = color?.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    let compact = lower.replace(' ', "");
    Some((lower, compact))
}

/// True when the URL mentions the color, with or without internal spaces.
pub fn url_matches_color(url: &str, needles: &(String, String)) -> bool {
    let url = url.to_lowercase();
    url.contains(needles.0.as_str()) || url.contains(needles.1.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImageFormat, ImageRecord};

    fn index_with_folders(folders: &[&str]) -> ImageIndex {
        let records = folders
            .iter()
            .map(|folder| ImageRecord {
                url: format!("/p/{folder}/1.jpg"),
                filename: "1.jpg".to_string(),
                folder_name: folder.to_string(),
                parent_folder_name: "p".to_string(),
                format: ImageFormat::Jpeg,
            })
            .collect();
        ImageIndex::build(records)
    }

    #[test]
    fn test_name_tokens_filters_short_words() {
        assert_eq!(
            name_tokens("Xylo Coffee Table  in Oak"),
            vec!["xylo", "coffee", "table"]
        );
        assert!(name_tokens("TV & Oak").is_empty());
        assert!(name_tokens("").is_empty());
    }

    #[test]
    fn test_name_tokens_counts_characters_not_bytes() {
        // "café" is 4 chars but 5 bytes
        assert_eq!(name_tokens("café"), vec!["café"]);
        assert!(name_tokens("été").is_empty());
    }

    #[test]
    fn test_rank_folders_by_score() {
        let index = index_with_folders(&["carlem", "carlem shoe rack", "xylo"]);
        let tokens = name_tokens("Carlem Shoe Rack");
        let ranked = rank_folders(&index, &tokens);
        let names: Vec<(&str, usize)> = ranked.iter().map(|(f, s)| (f.name.as_str(), *s)).collect();
        // "shoe" and "rack" are 4 chars, both count
        assert_eq!(names, vec![("carlem shoe rack", 3), ("carlem", 1)]);
    }

    #[test]
    fn test_rank_folders_ties_keep_walk_order() {
        let index = index_with_folders(&["zeta table", "alpha table", "beta"]);
        let ranked = rank_folders(&index, &name_tokens("Study Table"));
        let names: Vec<&str> = ranked.iter().map(|(f, _)| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta table", "alpha table"]);
    }

    #[test]
    fn test_rank_folders_substring_match() {
        let index = index_with_folders(&["maltein_tv_units"]);
        assert_eq!(rank_folders(&index, &name_tokens("Maltein TV Unit")).len(), 1);
    }

    #[test]
    fn test_color_needles() {
        assert_eq!(
            color_needles(Some(" Brown Maple ")),
            Some(("brown maple".to_string(), "brownmaple".to_string()))
        );
        assert_eq!(color_needles(Some("   ")), None);
        assert_eq!(color_needles(None), None);
    }

    #[test]
    fn test_url_matches_color_with_and_without_spaces() {
        let needles = color_needles(Some("Brown Maple")).unwrap();
        assert!(url_matches_color("/p/x/BrownMaple-1.jpg", &needles));
        assert!(url_matches_color("/p/x/brown maple 1.jpg", &needles));
        assert!(!url_matches_color("/p/x/brown-maple-1.jpg", &needles));
    }
}
