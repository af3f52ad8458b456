use std::path::PathBuf;

use shopfloor_core::{CellContent, CellKind, SheetId, SheetMeta, View};
use shopfloor_engine::{CellEdit, EngineError, StoredCell, Workbench};
use shopfloor_storage::{BlobStore, SqliteStorage, StorageError};
use tempfile::TempDir;

use crate::fixtures::LineItem;

/// A workbench over a SQLite file and image directory in a temp dir.
pub struct TestBench {
    pub workbench: Workbench,
    dir: TempDir,
}

impl TestBench {
    pub fn new() -> Result<Self, StorageError> {
        let dir = tempfile::tempdir()?;
        let workbench = open_workbench(&dir)?;
        Ok(Self { workbench, dir })
    }

    pub fn db_path(&self) -> PathBuf {
        db_path_in(&self.dir)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    /// An independent workbench on the same files, as a second process would see them.
    pub fn second_workbench(&self) -> Result<Workbench, StorageError> {
        open_workbench(&self.dir)
    }

    /// Drops the current connection and opens the files again.
    pub fn reopen(self) -> Result<Self, StorageError> {
        let Self { workbench, dir } = self;
        drop(workbench);
        let workbench = open_workbench(&dir)?;
        Ok(Self { workbench, dir })
    }

    /// Writes text through `view` coordinates.
    pub fn write(
        &mut self,
        sheet_id: SheetId,
        view: View,
        row: i64,
        column: i64,
        content: &str,
    ) -> Result<StoredCell, EngineError> {
        self.workbench.edit_cell(
            sheet_id,
            CellEdit {
                view,
                row,
                column,
                kind: CellKind::Text,
                content: content.to_string(),
            },
        )
    }

    /// Creates a sheet holding `items`, one per physical row.
    pub fn create_order(
        &mut self,
        meta: SheetMeta,
        items: &[LineItem],
    ) -> Result<SheetId, EngineError> {
        let sheet_id = self.workbench.create_sheet(meta)?;
        for (row, item) in (0u32..).zip(items) {
            for (slot, value) in item.slots() {
                self.workbench
                    .put_cell(sheet_id, row, slot, CellContent::text(value))?;
            }
        }
        Ok(sheet_id)
    }
}

fn db_path_in(dir: &TempDir) -> PathBuf {
    dir.path().join("shopfloor.db")
}

fn open_workbench(dir: &TempDir) -> Result<Workbench, StorageError> {
    let storage = SqliteStorage::open(&db_path_in(dir).to_string_lossy())?;
    let blobs = BlobStore::open(dir.path().join("images"))?;
    Ok(Workbench::new(storage, blobs))
}
