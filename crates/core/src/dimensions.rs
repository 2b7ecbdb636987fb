use std::collections::HashMap;

use tracing::debug;

use crate::domain::DimensionRecord;

/// Raw values from one row of the dimensions table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionRow {
    pub parent_sku: Option<String>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub weight_g: Option<f64>,
}

/// Parent SKU → physical dimensions.
#[derive(Debug, Default)]
pub struct DimensionTable {
    entries: HashMap<String, DimensionRecord>,
}

impl DimensionTable {
    /// Build the lookup. Rows without a parent SKU are skipped; a repeated
    /// parent SKU replaces the earlier record outright.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = DimensionRow>,
    {
        let mut entries = HashMap::new();
        for row in rows {
            let key = match row.parent_sku.as_deref().map(normalize_key) {
                Some(k) if !k.is_empty() => k,
                _ => continue,
            };
            let record = convert_row(&row);
            if entries.insert(key.clone(), record).is_some() {
                debug!(parent_sku = %key, "dimension row replaces earlier entry");
            }
        }
        Self { entries }
    }

    /// Dimensions for a parent SKU. Child SKUs must be looked up by their parent.
    pub fn get(&self, parent_sku: &str) -> Option<&DimensionRecord> {
        self.entries.get(&normalize_key(parent_sku))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(sku: &str) -> String {
    sku.trim().to_uppercase()
}

/// Convert one raw row: centimetres truncate to whole numbers, grams become
/// kilograms rounded to two decimals. Missing, non-positive, or values that
/// convert to zero become `None`.
pub fn convert_row(row: &DimensionRow) -> DimensionRecord {
    DimensionRecord {
        length_cm: convert_cm(row.length_cm),
        width_cm: convert_cm(row.width_cm),
        height_cm: convert_cm(row.height_cm),
        weight_kg: convert_weight(row.weight_g),
    }
}

fn convert_cm(value: Option<f64>) -> Option<u32> {
    let v = value.filter(|v| v.is_finite() && *v > 0.0)?;
    let cm = v.trunc() as u32;
    (cm > 0).then_some(cm)
}

fn convert_weight(grams: Option<f64>) -> Option<f64> {
    let g = grams.filter(|g| g.is_finite() && *g > 0.0)?;
    let kg = (g / 1000.0 * 100.0).round() / 100.0;
    (kg > 0.0).then_some(kg)
}
