use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use skumatch_core::category::classify;
use skumatch_core::config::CatalogConfig;
use skumatch_core::matching::{resolve_images, ImageQuery, Resolution};
use skumatch_core::Catalog;

/// Command-line inputs for a one-off resolution.
pub struct QueryArgs {
    pub sku: String,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl QueryArgs {
    fn as_query(&self) -> ImageQuery<'_> {
        ImageQuery {
            sku: &self.sku,
            parent_sku: self.parent.as_deref(),
            product_name: self.name.as_deref(),
            color: self.color.as_deref(),
        }
    }
}

/// One-line description of how a resolution went.
pub(crate) fn describe_outcome(resolution: &Resolution) -> String {
    if let Some(reason) = resolution.miss_reason {
        return format!("No images: {reason}");
    }
    let tiers: Vec<&str> = resolution.tiers.iter().map(|t| t.as_str()).collect();
    format!(
        "{} image(s) via {}",
        resolution.urls.len(),
        tiers.join(" + ")
    )
}

pub fn run(config: &CatalogConfig, args: &QueryArgs) -> Result<()> {
    let catalog = Catalog::new(config.clone())?;
    let index = catalog.build_index()?;
    let resolution = resolve_images(&args.as_query(), &index);
    let category = classify(&args.sku);

    println!();
    println!("  {} ({})", args.sku, category.category_name);
    println!("  {}", describe_outcome(&resolution));

    if resolution.is_matched() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![Cell::new("#"), Cell::new("URL")]);
        for (i, url) in resolution.urls.iter().enumerate() {
            let pos = if i == 0 {
                Cell::new("thumb").fg(Color::Green)
            } else {
                Cell::new(i + 1)
            };
            table.add_row(vec![pos, Cell::new(url)]);
        }
        println!();
        println!("{table}");
    } else {
        println!("  Placeholder: {}", config.storefront.placeholder_image);
    }
    println!();

    Ok(())
}
