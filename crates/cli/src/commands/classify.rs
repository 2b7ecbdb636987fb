use skumatch_core::category::{classify, DEFAULT_CATEGORY};

pub fn run(sku: &str) {
    let info = classify(sku);
    let fallback = if info == DEFAULT_CATEGORY && !sku.trim().is_empty() {
        "  (no prefix matched)"
    } else {
        ""
    };

    println!();
    println!("  SKU:          {}", sku.trim());
    println!("  Category:     {}{fallback}", info.category_name);
    println!("  Category ID:  {}", info.category_id);
    println!("  Product type: {}", info.product_type);
    println!();
}
