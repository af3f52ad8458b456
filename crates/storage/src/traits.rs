use shopfloor_core::{Cell, CellAddress, MetaPatch, SheetId, SheetMeta, Stage};

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRecord {
    pub sheet_id: SheetId,
    pub meta: SheetMeta,
    pub stage: Stage,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Persistence for sheet headers and their sparse cells.
///
/// Every write runs in its own transaction and bumps the sheet's
/// `updated_at`. Writes against an unknown sheet fail with `NotFound`.
pub trait SheetStore {
    fn insert_sheet(&mut self, sheet_id: SheetId, meta: &SheetMeta) -> Result<(), StorageError>;

    fn get_sheet(&self, sheet_id: SheetId) -> Result<Option<SheetRecord>, StorageError>;

    fn list_sheets(&self) -> Result<Vec<SheetRecord>, StorageError>;

    fn get_cells(&self, sheet_id: SheetId) -> Result<Vec<Cell>, StorageError>;

    fn upsert_cell(&mut self, sheet_id: SheetId, cell: &Cell) -> Result<(), StorageError>;

    /// Returns whether a stored cell was removed.
    fn delete_cell(
        &mut self,
        sheet_id: SheetId,
        address: CellAddress,
    ) -> Result<bool, StorageError>;

    fn update_meta(&mut self, sheet_id: SheetId, patch: &MetaPatch) -> Result<(), StorageError>;

    fn set_stage(&mut self, sheet_id: SheetId, stage: Stage) -> Result<(), StorageError>;
}
