//! Sheet payloads handed to clients: the editor document with every view,
//! and the printable rendition of a single view.

use serde::Serialize;
use shopfloor_core::projection::leading_number;
use shopfloor_core::view::Derived;
use shopfloor_core::view::Source;
use shopfloor_core::{
    Cell, CellGrid, ProjectedRow, Projection, SheetId, SheetMeta, Stage, View, project,
};
use shopfloor_storage::SheetRecord;

/// Printed tables never show fewer lines than this.
pub const MIN_PRINT_ROWS: usize = 4;

/// A sheet as stored: header plus sparse cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSnapshot {
    pub record: SheetRecord,
    pub cells: Vec<Cell>,
}

impl SheetSnapshot {
    pub fn id(&self) -> SheetId {
        self.record.sheet_id
    }

    pub fn grid(&self) -> CellGrid {
        CellGrid::from_cells(&self.cells)
    }

    pub fn project(&self, view: View) -> Projection {
        project(view, &self.grid())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetViews {
    pub shipping: Projection,
    pub quotation: Projection,
    pub production: Projection,
    pub outsourcing: Projection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDocument {
    pub id: SheetId,
    pub meta: SheetMeta,
    pub stage: Stage,
    pub updated_at: i64,
    pub row_count: u32,
    pub views: SheetViews,
}

impl From<&SheetSnapshot> for SheetDocument {
    fn from(snapshot: &SheetSnapshot) -> Self {
        let grid = snapshot.grid();
        Self {
            id: snapshot.record.sheet_id,
            meta: snapshot.record.meta.clone(),
            stage: snapshot.record.stage,
            updated_at: snapshot.record.updated_at_ms,
            row_count: grid.row_count(),
            views: SheetViews {
                shipping: project(View::Shipping, &grid),
                quotation: project(View::Quotation, &grid),
                production: project(View::Production, &grid),
                outsourcing: project(View::Outsourcing, &grid),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintDocument {
    pub title: &'static str,
    pub view: View,
    pub sheet_id: SheetId,
    pub meta: SheetMeta,
    pub headers: Vec<&'static str>,
    pub rows: Vec<ProjectedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<String>,
}

pub fn print_title(view: View) -> &'static str {
    match view {
        View::Shipping => "Shipping List",
        View::Quotation => "Quotation",
        View::Production => "Production Sheet",
        View::Outsourcing => "Purchase Order",
    }
}

impl PrintDocument {
    pub fn render(snapshot: &SheetSnapshot, view: View) -> Self {
        let projection = snapshot.project(view);
        let grand_total = grand_total(&projection);
        let projection = projection.pad_to(MIN_PRINT_ROWS);
        Self {
            title: print_title(view),
            view,
            sheet_id: snapshot.id(),
            meta: snapshot.record.meta.clone(),
            headers: projection.headers,
            rows: projection.rows,
            grand_total,
        }
    }
}

/// Sum of the total-price column, for views that have one.
fn grand_total(projection: &Projection) -> Option<String> {
    let column = projection
        .view
        .columns()
        .iter()
        .position(|c| c.source == Source::Derived(Derived::TotalPrice))?;
    let sum: f64 = projection
        .rows
        .iter()
        .filter_map(|row| row.cells.get(column))
        .map(|cell| leading_number(&cell.content))
        .sum();
    Some(if sum > 0.0 {
        format!("{sum:.2}")
    } else {
        String::new()
    })
}
