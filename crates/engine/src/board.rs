use serde::Serialize;
use shopfloor_core::{SheetId, SheetMeta, Stage};
use shopfloor_storage::SheetRecord;

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSummary {
    pub id: SheetId,
    pub title: String,
    pub meta: SheetMeta,
    pub stage: Stage,
    pub updated_at: i64,
}

impl From<SheetRecord> for SheetSummary {
    fn from(record: SheetRecord) -> Self {
        // Cards without an order number fall back to the sheet id.
        let title = if record.meta.order_id.is_empty() {
            record.sheet_id.to_string()
        } else {
            record.meta.order_id.clone()
        };
        Self {
            id: record.sheet_id,
            title,
            meta: record.meta,
            stage: record.stage,
            updated_at: record.updated_at_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub stage: Stage,
    pub sheets: Vec<SheetSummary>,
}

/// Groups cards into every stage column, in board order.
pub fn group_by_stage(sheets: impl IntoIterator<Item = SheetSummary>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = Stage::ALL
        .into_iter()
        .map(|stage| BoardColumn {
            stage,
            sheets: Vec::new(),
        })
        .collect();
    for sheet in sheets {
        if let Some(column) = columns.iter_mut().find(|c| c.stage == sheet.stage) {
            column.sheets.push(sheet);
        }
    }
    columns
}
