//! Read and write mapping between a sheet's sparse cells and a view grid.

use serde::Serialize;

use crate::cell::{CellAddress, CellContent, CellGrid, Slot, check_row};
use crate::error::CoreError;
use crate::view::{Derived, OUTSOURCED_FLAG, Source, View};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedRow {
    /// 1-based number shown to the reader.
    pub number: u32,
    /// Physical row this line came from; `None` for padding rows.
    pub source_row: Option<u32>,
    pub cells: Vec<CellContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub view: View,
    pub headers: Vec<&'static str>,
    pub keys: Vec<&'static str>,
    pub rows: Vec<ProjectedRow>,
}

impl Projection {
    /// Appends blank rows until at least `min_rows` are present.
    pub fn pad_to(mut self, min_rows: usize) -> Self {
        let width = self.headers.len();
        while self.rows.len() < min_rows {
            let number = self.rows.len() as u32 + 1;
            self.rows.push(ProjectedRow {
                number,
                source_row: None,
                cells: vec![CellContent::default(); width],
            });
        }
        self
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellContent> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }
}

/// Physical rows that appear in `view`, in display order.
pub fn source_rows(view: View, grid: &CellGrid) -> Vec<u32> {
    let rows = 0..grid.row_count();
    match view.row_filter() {
        Some(flag) => rows
            .filter(|row| {
                grid.get(*row, flag)
                    .is_some_and(|c| c.content == OUTSOURCED_FLAG)
            })
            .collect(),
        None => rows.collect(),
    }
}

pub fn project(view: View, grid: &CellGrid) -> Projection {
    let columns = view.columns();
    let rows = source_rows(view, grid)
        .into_iter()
        .enumerate()
        .map(|(i, source)| {
            let cells = columns
                .iter()
                .map(|col| match col.source {
                    Source::Stored(slot) => grid.resolve(source, slot),
                    Source::Derived(derived) => derive(derived, grid, source),
                })
                .collect();
            ProjectedRow {
                number: i as u32 + 1,
                source_row: Some(source),
                cells,
            }
        })
        .collect();

    Projection {
        view,
        headers: view.headers(),
        keys: columns.iter().map(|c| c.key).collect(),
        rows,
    }
}

/// Maps a visual (row, column) of `view` to the stored address it edits.
///
/// Unfiltered views address physical rows directly, so writing past the last
/// row extends the sheet. Filtered views only address rows they display.
pub fn unproject(
    view: View,
    grid: &CellGrid,
    row: u32,
    column: usize,
) -> Result<CellAddress, CoreError> {
    let row = check_row(row)?;
    let spec = view.column(column)?;
    let slot = match spec.source {
        Source::Stored(slot) => slot,
        Source::Derived(_) => {
            return Err(CoreError::ReadOnlyColumn {
                view: view.as_str(),
                column: spec.key,
            });
        }
    };

    let physical_row = if view.row_filter().is_some() {
        *source_rows(view, grid).get(row as usize).ok_or_else(|| {
            CoreError::InvalidAddress(format!(
                "row {row} of view {} has no source line item",
                view.as_str()
            ))
        })?
    } else {
        row
    };

    Ok(CellAddress::new(physical_row, slot))
}

fn derive(derived: Derived, grid: &CellGrid, row: u32) -> CellContent {
    match derived {
        Derived::TotalPrice => {
            let quantity = grid.resolve(row, Slot::Quantity);
            let unit_price = grid.resolve(row, Slot::UnitPrice);
            CellContent::text(total_price(&quantity.content, &unit_price.content))
        }
    }
}

/// `quantity × unit_price` to two decimals, or `""` unless the product is
/// positive.
pub fn total_price(quantity: &str, unit_price: &str) -> String {
    let total = leading_number(quantity) * leading_number(unit_price);
    if total > 0.0 {
        format!("{total:.2}")
    } else {
        String::new()
    }
}

/// Reads the longest numeric prefix of `s` (after leading whitespace),
/// yielding 0 when there is none.
pub fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}
