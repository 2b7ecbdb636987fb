use crate::domain::CategoryInfo;

const fn info(
    category_id: &'static str,
    category_name: &'static str,
    product_type: &'static str,
) -> CategoryInfo {
    CategoryInfo {
        category_id,
        category_name,
        product_type,
    }
}

/// SKU prefix → category, checked top to bottom; the first literal prefix match wins.
/// A prefix must come before any shorter prefix it extends (`BT-` before `B-`,
/// `WS-` before `W-`).
pub const CATEGORY_TABLE: &[(&str, CategoryInfo)] = &[
    ("BT-", info("bedroom", "Bedside Tables", "bedside-table")),
    ("BS-", info("study-office", "Book Shelves", "bookshelf")),
    ("B-", info("bedroom", "Beds", "bed")),
    ("SB-", info("study-office", "Book Shelves", "bookshelf")),
    ("CT-", info("living-room", "Coffee Tables", "coffee-table")),
    ("DT-", info("dining-kitchen", "Dining Tables", "dining-table")),
    ("DR-", info("bedroom", "Dressing Tables", "dressing-table")),
    ("LT-", info("study-office", "Laptop Tables", "laptop-table")),
    ("RD-", info("study-office", "Laptop Tables", "laptop-table")),
    ("KR-", info("dining-kitchen", "Kitchen Racks", "kitchen-rack")),
    ("KH-", info("decor", "Key Holders", "keyholder")),
    ("CS-", info("decor", "Coasters", "coaster")),
    ("SR-", info("decor", "Shoe Racks", "shoe-rack")),
    ("TU-", info("living-room", "TV Units", "tv-unit")),
    ("WS-", info("decor", "Wall Shelves", "wall-shelf")),
    ("W-", info("bedroom", "Wardrobes", "wardrobe")),
    ("ST-", info("study-office", "Study Tables", "study-table")),
    ("MT-", info("decor", "Home Temples", "home-temple")),
];

pub const DEFAULT_CATEGORY: CategoryInfo = info("living-room", "Furniture", "furniture");

/// Classify a SKU by the first matching prefix in [`CATEGORY_TABLE`].
pub fn classify(sku: &str) -> CategoryInfo {
    let sku = sku.trim().to_uppercase();
    CATEGORY_TABLE
        .iter()
        .find(|(prefix, _)| sku.starts_with(prefix))
        .map(|(_, info)| *info)
        .unwrap_or(DEFAULT_CATEGORY)
}
