pub mod board;
pub mod document;
pub mod error;

pub use board::{BoardColumn, SheetSummary};
pub use document::{PrintDocument, SheetDocument, SheetSnapshot, SheetViews};
pub use error::{EngineError, ErrorKind};

use serde::{Deserialize, Serialize};
use shopfloor_core::image::{self, decode_data_uri};
use shopfloor_core::{
    Cell, CellAddress, CellContent, CellGrid, CellKind, MetaPatch, Projection, SheetId, SheetMeta,
    Slot, Stage, View, check_row, unproject,
};
use shopfloor_storage::blob::StoredBlob;
use shopfloor_storage::{BlobStore, SheetStore, SqliteStorage, StorageError};

use crate::error::StorageContext;

/// One cell edit addressed in view coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub view: View,
    pub row: i64,
    #[serde(alias = "logicalColumn")]
    pub column: i64,
    #[serde(default)]
    pub kind: CellKind,
    #[serde(default)]
    pub content: String,
}

/// A view coordinate without content, for clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellTarget {
    pub view: View,
    pub row: i64,
    #[serde(alias = "logicalColumn")]
    pub column: i64,
}

/// What an edit persisted, including any image normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCell {
    pub row: u32,
    pub column: usize,
    pub slot: &'static str,
    pub kind: CellKind,
    pub content: String,
}

/// Sheet store, image blobs and the view projector behind one handle.
///
/// Each method is one read-modify-write cycle against the store.
pub struct Workbench {
    storage: SqliteStorage,
    blobs: BlobStore,
}

impl Workbench {
    pub fn new(storage: SqliteStorage, blobs: BlobStore) -> Self {
        Self { storage, blobs }
    }

    // ------------------------------------------------------------------
    // Sheets
    // ------------------------------------------------------------------

    pub fn create_sheet(&mut self, meta: SheetMeta) -> Result<SheetId, EngineError> {
        let sheet_id = SheetId::new();
        self.storage.insert_sheet(sheet_id, &meta).during("create sheet")?;
        tracing::info!(%sheet_id, order_id = %meta.order_id, "created sheet");
        Ok(sheet_id)
    }

    /// Reads a sheet without creating it.
    pub fn get_sheet(&self, sheet_id: SheetId) -> Result<SheetSnapshot, EngineError> {
        let record = self
            .storage
            .get_sheet(sheet_id)
            .during("load sheet")?
            .ok_or_else(|| EngineError::NotFound(format!("sheet {sheet_id}")))?;
        let cells = self.storage.get_cells(sheet_id).during("load cells")?;
        Ok(SheetSnapshot { record, cells })
    }

    /// Reads a sheet, first creating it empty when it does not exist.
    pub fn get_or_create_sheet(&mut self, sheet_id: SheetId) -> Result<SheetSnapshot, EngineError> {
        if self.storage.get_sheet(sheet_id).during("load sheet")?.is_none() {
            match self.storage.insert_sheet(sheet_id, &SheetMeta::default()) {
                Ok(()) => tracing::info!(%sheet_id, "created sheet on first reference"),
                // Another writer got there first.
                Err(StorageError::SheetCollision { .. }) => {}
                Err(e) => return Err(EngineError::from_storage("create sheet", e)),
            }
        }
        self.get_sheet(sheet_id)
    }

    pub fn document(&self, sheet_id: SheetId) -> Result<SheetDocument, EngineError> {
        Ok(SheetDocument::from(&self.get_sheet(sheet_id)?))
    }

    pub fn view(&self, sheet_id: SheetId, view: View) -> Result<Projection, EngineError> {
        Ok(self.get_sheet(sheet_id)?.project(view))
    }

    pub fn print_document(&self, sheet_id: SheetId, view: View) -> Result<PrintDocument, EngineError> {
        Ok(PrintDocument::render(&self.get_sheet(sheet_id)?, view))
    }

    pub fn list_sheets(&self) -> Result<Vec<SheetSummary>, EngineError> {
        let records = self.storage.list_sheets().during("list sheets")?;
        Ok(records.into_iter().map(SheetSummary::from).collect())
    }

    pub fn board(&self) -> Result<Vec<BoardColumn>, EngineError> {
        Ok(board::group_by_stage(self.list_sheets()?))
    }

    /// Applies a partial metadata update. Every field name is checked before
    /// anything is written.
    pub fn update_meta<K, V>(
        &mut self,
        sheet_id: SheetId,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<SheetMeta, EngineError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let patch = MetaPatch::from_pairs(fields)?;
        self.storage.update_meta(sheet_id, &patch).during("update metadata")?;
        let record = self
            .storage
            .get_sheet(sheet_id)
            .during("load sheet")?
            .ok_or_else(|| EngineError::NotFound(format!("sheet {sheet_id}")))?;
        tracing::debug!(%sheet_id, fields = patch.len(), "updated metadata");
        Ok(record.meta)
    }

    pub fn set_stage(&mut self, sheet_id: SheetId, stage: Stage) -> Result<(), EngineError> {
        self.storage.set_stage(sheet_id, stage).during("move sheet")?;
        tracing::info!(%sheet_id, stage = stage.as_str(), "moved sheet");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cells
    // ------------------------------------------------------------------

    /// Writes one cell addressed in view coordinates.
    ///
    /// Embedded image payloads are decoded and written to the blob store
    /// before the cell row, so a failed decode leaves the cell untouched.
    pub fn edit_cell(&mut self, sheet_id: SheetId, edit: CellEdit) -> Result<StoredCell, EngineError> {
        let (address, column) = self.resolve_target(sheet_id, edit.view, edit.row, edit.column)?;
        let content = self.normalize_content(edit.kind, edit.content)?;

        let cell = Cell::new(address, content);
        self.storage.upsert_cell(sheet_id, &cell).during("write cell")?;
        tracing::debug!(
            %sheet_id,
            view = edit.view.as_str(),
            row = address.row,
            slot = address.slot.key(),
            kind = cell.content.kind.as_str(),
            "wrote cell"
        );

        Ok(StoredCell {
            row: address.row,
            column,
            slot: address.slot.key(),
            kind: cell.content.kind,
            content: cell.content.content,
        })
    }

    /// Reverts one cell to the blank default. Returns whether a stored value
    /// was removed.
    pub fn clear_cell(&mut self, sheet_id: SheetId, target: CellTarget) -> Result<bool, EngineError> {
        let (address, _) = self.resolve_target(sheet_id, target.view, target.row, target.column)?;
        let removed = self.storage.delete_cell(sheet_id, address).during("clear cell")?;
        tracing::debug!(%sheet_id, row = address.row, slot = address.slot.key(), removed, "cleared cell");
        Ok(removed)
    }

    /// Writes a stored cell directly by physical address.
    pub fn put_cell(
        &mut self,
        sheet_id: SheetId,
        row: u32,
        slot: Slot,
        content: CellContent,
    ) -> Result<(), EngineError> {
        let row = check_row(row)?;
        let content = self.normalize_content(content.kind, content.content)?;
        let cell = Cell::new(CellAddress::new(row, slot), content);
        self.storage.upsert_cell(sheet_id, &cell).during("write cell")
    }

    fn resolve_target(
        &self,
        sheet_id: SheetId,
        view: View,
        row: i64,
        column: i64,
    ) -> Result<(CellAddress, usize), EngineError> {
        let row = u32::try_from(row)
            .map_err(|_| EngineError::InvalidAddress(format!("row {row} is out of range")))?;
        let column = usize::try_from(column)
            .map_err(|_| EngineError::InvalidAddress(format!("column {column} is out of range")))?;

        // Filtered views need the current rows to map a visual row; the
        // others address physical rows directly.
        let grid = if view.row_filter().is_some() {
            self.get_sheet(sheet_id)?.grid()
        } else {
            self.storage
                .get_sheet(sheet_id)
                .during("load sheet")?
                .ok_or_else(|| EngineError::NotFound(format!("sheet {sheet_id}")))?;
            CellGrid::new()
        };
        Ok((unproject(view, &grid, row, column)?, column))
    }

    fn normalize_content(&self, kind: CellKind, content: String) -> Result<CellContent, EngineError> {
        if kind == CellKind::Image {
            if let Some(embedded) = decode_data_uri(&content)? {
                let path = self.blobs.put_embedded(&embedded).during("store image")?;
                return Ok(CellContent::image(path));
            }
        }
        Ok(CellContent { kind, content })
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Stores uploaded bytes and returns their reference path.
    pub fn store_image(&self, bytes: &[u8], file_name: &str) -> Result<String, EngineError> {
        if bytes.is_empty() {
            return Err(EngineError::InvalidInput("uploaded file is empty".into()));
        }
        let path = self
            .blobs
            .put(bytes, &image::extension_of(file_name))
            .during("store image")?;
        tracing::info!(%path, len = bytes.len(), "stored uploaded image");
        Ok(path)
    }

    pub fn load_image(&self, file_name: &str) -> Result<StoredBlob, EngineError> {
        self.blobs.get(file_name).during("read image")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfloor_core::MAX_ROWS;

    fn workbench() -> (tempfile::TempDir, Workbench) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::open_in_memory().unwrap();
        let blobs = BlobStore::open(dir.path().join("images")).unwrap();
        (dir, Workbench::new(storage, blobs))
    }

    fn edit(view: View, row: i64, column: i64, content: &str) -> CellEdit {
        CellEdit {
            view,
            row,
            column,
            kind: CellKind::Text,
            content: content.to_string(),
        }
    }

    #[test]
    fn get_sheet_never_creates() {
        let (_dir, bench) = workbench();
        let err = bench.get_sheet(SheetId::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(bench.list_sheets().unwrap().is_empty());
    }

    #[test]
    fn get_or_create_seeds_an_empty_sheet_once() {
        let (_dir, mut bench) = workbench();
        let id = SheetId::new();
        let first = bench.get_or_create_sheet(id).unwrap();
        assert!(first.cells.is_empty());
        assert_eq!(first.record.meta, SheetMeta::default());
        assert_eq!(first.record.stage, Stage::Quoting);

        bench.update_meta(id, [("customerName", "Acme")]).unwrap();
        let second = bench.get_or_create_sheet(id).unwrap();
        assert_eq!(second.record.meta.customer_name, "Acme");
        assert_eq!(bench.list_sheets().unwrap().len(), 1);
    }

    #[test]
    fn quotation_edit_lands_in_unit_price_slot() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        bench.edit_cell(id, edit(View::Quotation, 0, 3, "100")).unwrap();
        let stored = bench.edit_cell(id, edit(View::Quotation, 0, 6, "12.5")).unwrap();
        assert_eq!(stored.slot, "unitPrice");

        let quotation = bench.view(id, View::Quotation).unwrap();
        assert_eq!(quotation.cell(0, 7).unwrap().content, "1250.00");
        let outsourcing = bench.view(id, View::Outsourcing).unwrap();
        assert!(outsourcing.rows.is_empty());
    }

    #[test]
    fn derived_and_out_of_range_columns_are_rejected() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        let err = bench.edit_cell(id, edit(View::Quotation, 0, 7, "1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadOnlyColumn);
        let err = bench.edit_cell(id, edit(View::Shipping, 0, 99, "1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddress);
        let err = bench.edit_cell(id, edit(View::Shipping, -1, 0, "1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddress);
        assert!(bench.get_sheet(id).unwrap().cells.is_empty());
    }

    #[test]
    fn rows_past_the_bound_are_rejected_and_the_sheet_still_reads() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        for row in [i64::from(MAX_ROWS), i64::from(u32::MAX), i64::from(u32::MAX) + 1] {
            let err = bench.edit_cell(id, edit(View::Shipping, row, 1, "x")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAddress);
        }
        let err = bench
            .put_cell(id, u32::MAX, Slot::Name, CellContent::text("x"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddress);

        let last = i64::from(MAX_ROWS - 1);
        let stored = bench.edit_cell(id, edit(View::Shipping, last, 1, "last")).unwrap();
        assert_eq!(stored.row, MAX_ROWS - 1);

        let document = bench.document(id).unwrap();
        assert_eq!(bench.get_sheet(id).unwrap().cells.len(), 1);
        assert_eq!(document.views.shipping.rows.len(), MAX_ROWS as usize);
    }

    #[test]
    fn edits_against_unknown_sheet_are_not_found() {
        let (_dir, mut bench) = workbench();
        let err = bench.edit_cell(SheetId::new(), edit(View::Shipping, 0, 1, "x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn outsourcing_edit_targets_the_flagged_row() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        bench.edit_cell(id, edit(View::Shipping, 0, 1, "bracket")).unwrap();
        bench.edit_cell(id, edit(View::Shipping, 2, 1, "shaft")).unwrap();
        bench.edit_cell(id, edit(View::Shipping, 2, 6, "true")).unwrap();

        let stored = bench.edit_cell(id, edit(View::Outsourcing, 0, 5, "3.5")).unwrap();
        assert_eq!(stored.row, 2);
        assert_eq!(stored.slot, "unitPrice");

        let err = bench.edit_cell(id, edit(View::Outsourcing, 1, 5, "1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddress);
    }

    #[test]
    fn embedded_images_become_reference_paths() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        let stored = bench
            .edit_cell(
                id,
                CellEdit {
                    view: View::Shipping,
                    row: 0,
                    column: 0,
                    kind: CellKind::Image,
                    content: "data:image/png;base64,aGVsbG8=".into(),
                },
            )
            .unwrap();
        assert_eq!(stored.kind, CellKind::Image);
        assert!(stored.content.starts_with("/images/"));
        assert!(stored.content.ends_with(".png"));

        let file_name = stored.content.trim_start_matches("/images/");
        assert_eq!(bench.load_image(file_name).unwrap().bytes, b"hello");

        let cells = bench.get_sheet(id).unwrap().cells;
        assert_eq!(cells[0].content.content, stored.content);
    }

    #[test]
    fn malformed_image_leaves_cell_unchanged() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        bench.edit_cell(id, edit(View::Shipping, 0, 0, "old")).unwrap();
        let err = bench
            .edit_cell(
                id,
                CellEdit {
                    view: View::Shipping,
                    row: 0,
                    column: 0,
                    kind: CellKind::Image,
                    content: "data:image/png;base64,***".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
        let cells = bench.get_sheet(id).unwrap().cells;
        assert_eq!(cells[0].content, CellContent::text("old"));
    }

    #[test]
    fn clearing_reverts_to_blank() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        bench.edit_cell(id, edit(View::Production, 1, 6, "milling")).unwrap();
        let target = CellTarget {
            view: View::Production,
            row: 1,
            column: 6,
        };
        assert!(bench.clear_cell(id, target).unwrap());
        assert!(!bench.clear_cell(id, target).unwrap());
        assert_eq!(bench.view(id, View::Production).unwrap().rows.len(), 0);
    }

    #[test]
    fn unknown_meta_field_changes_nothing() {
        let (_dir, mut bench) = workbench();
        let id = bench
            .create_sheet(SheetMeta {
                customer_name: "Acme".into(),
                ..SheetMeta::default()
            })
            .unwrap();
        let err = bench
            .update_meta(id, [("orderId", "QUO-1"), ("foo", "bar")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
        let meta = bench.get_sheet(id).unwrap().record.meta;
        assert_eq!(meta.customer_name, "Acme");
        assert_eq!(meta.order_id, "");
    }

    #[test]
    fn board_follows_stage_moves() {
        let (_dir, mut bench) = workbench();
        let id = bench.create_sheet(SheetMeta::default()).unwrap();
        bench.set_stage(id, Stage::Machining).unwrap();
        let board = bench.board().unwrap();
        let machining = board.iter().find(|c| c.stage == Stage::Machining).unwrap();
        assert_eq!(machining.sheets[0].id, id);
        assert!(board[0].sheets.is_empty());
    }

    #[test]
    fn empty_upload_is_rejected() {
        let (_dir, bench) = workbench();
        let err = bench.store_image(b"", "photo.png").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let path = bench.store_image(b"\xff\xd8", "photo.JPEG").unwrap();
        assert!(path.ends_with(".jpg"));
    }
}
