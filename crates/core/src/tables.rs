use crate::config::{DimensionColumns, SkuColumns};
use crate::dimensions::DimensionRow;
use crate::domain::{SkipReason, SkuRow};
use crate::error::{Error, Result};
use crate::sheet::{Cell, Table};

/// An unvalidated row of the SKU/alias table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSkuRow {
    /// 1-based position among the table's data rows.
    pub row: usize,
    pub sku: Cell,
    pub parent_sku: Cell,
    pub parent_name: Cell,
    pub product_name: Cell,
    pub color: Cell,
    pub mrp: Cell,
}

/// Outcome of validating one source row.
#[derive(Debug)]
pub enum RowVerdict {
    Valid(SkuRow),
    /// Expected in messy source data; the row is dropped and reported.
    Skip(SkipReason),
    /// The table itself is damaged; the run must stop.
    Fatal(Error),
}

impl RawSkuRow {
    /// Validate the required fields and convert to a [`SkuRow`].
    ///
    /// A blank SKU or product name skips the row. A spreadsheet error value
    /// in either column is fatal. Optional fields holding error values are
    /// treated as blank.
    pub fn validate(&self, columns: &SkuColumns) -> RowVerdict {
        if let Some(fatal) = self.corrupt(&self.sku, &columns.sku) {
            return RowVerdict::Fatal(fatal);
        }
        if let Some(fatal) = self.corrupt(&self.product_name, &columns.product_name) {
            return RowVerdict::Fatal(fatal);
        }

        let sku = match self.sku.as_text() {
            Some(s) => s,
            None => return RowVerdict::Skip(SkipReason::MissingSku),
        };
        let product_name = match self.product_name.as_text() {
            Some(n) => n,
            None => return RowVerdict::Skip(SkipReason::MissingProductName),
        };

        RowVerdict::Valid(SkuRow {
            sku,
            parent_sku: self.parent_sku.as_text(),
            parent_name: self.parent_name.as_text(),
            product_name,
            color: self.color.as_text(),
            mrp: self.mrp.as_number(),
        })
    }

    fn corrupt(&self, cell: &Cell, column: &str) -> Option<Error> {
        match cell {
            Cell::Error(value) => Some(Error::CorruptCell {
                row: self.row,
                column: column.to_string(),
                value: value.clone(),
            }),
            _ => None,
        }
    }
}

fn cell_at(row: &[Cell], col: Option<usize>) -> Cell {
    col.and_then(|c| row.get(c)).cloned().unwrap_or(Cell::Empty)
}

/// Map the SKU/alias table to raw rows. The SKU and product-name columns
/// must exist; the rest may be absent.
pub fn sku_rows(table: &Table, columns: &SkuColumns) -> Result<Vec<RawSkuRow>> {
    let sku = Some(table.require_column("SKU", &columns.sku)?);
    let product_name = Some(table.require_column("SKU", &columns.product_name)?);
    let parent_sku = table.column(&columns.parent_sku);
    let parent_name = table.column(&columns.parent_name);
    let color = table.column(&columns.color);
    let mrp = table.column(&columns.mrp);

    Ok(table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| RawSkuRow {
            row: i + 1,
            sku: cell_at(row, sku),
            parent_sku: cell_at(row, parent_sku),
            parent_name: cell_at(row, parent_name),
            product_name: cell_at(row, product_name),
            color: cell_at(row, color),
            mrp: cell_at(row, mrp),
        })
        .collect())
}

/// Map the dimensions table to raw dimension rows. Only the parent SKU
/// column is required.
pub fn dimension_rows(table: &Table, columns: &DimensionColumns) -> Result<Vec<DimensionRow>> {
    let parent = Some(table.require_column("dimensions", &columns.parent_sku)?);
    let length = table.column(&columns.length);
    let width = table.column(&columns.width);
    let height = table.column(&columns.height);
    let weight = table.column(&columns.weight_grams);

    Ok(table
        .rows()
        .iter()
        .map(|row| DimensionRow {
            parent_sku: cell_at(row, parent).as_text(),
            length_cm: cell_at(row, length).as_number(),
            width_cm: cell_at(row, width).as_number(),
            height_cm: cell_at(row, height).as_number(),
            weight_g: cell_at(row, weight).as_number(),
        })
        .collect())
}
