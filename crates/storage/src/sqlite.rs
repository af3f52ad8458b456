use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use shopfloor_core::{
    Cell, CellAddress, CellContent, CellKind, MetaPatch, SheetId, SheetMeta, Slot, Stage,
};

use crate::error::StorageError;
use crate::traits::{SheetRecord, SheetStore};

const NOW_MS: &str = "CAST(unixepoch('now','subsec') * 1000 AS INTEGER)";

const SHEET_COLUMNS: &str =
    "sheet_id, customer_name, order_id, contact_person, notes, stage, created_at, updated_at";

/// Convert Vec<u8> to fixed-size array with proper error handling.
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], StorageError> {
    v.try_into()
        .map_err(|_| StorageError::Serialization(format!("invalid {label} length")))
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }
}

type SheetRow = (Vec<u8>, String, String, String, String, String, i64, i64);

fn sheet_row(row: &rusqlite::Row) -> rusqlite::Result<SheetRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn read_sheet(row: SheetRow) -> Result<SheetRecord, StorageError> {
    let (id_bytes, customer_name, order_id, contact_person, notes, stage, created, updated) = row;
    Ok(SheetRecord {
        sheet_id: SheetId::from_bytes(to_array::<16>(id_bytes, "sheet_id")?),
        meta: SheetMeta {
            customer_name,
            order_id,
            contact_person,
            notes,
        },
        stage: Stage::parse(&stage)?,
        created_at_ms: created,
        updated_at_ms: updated,
    })
}

fn read_cell(row_index: i64, slot: i64, kind: &str, content: String) -> Result<Cell, StorageError> {
    let row = u32::try_from(row_index)
        .map_err(|_| StorageError::Serialization(format!("invalid row index {row_index}")))?;
    Ok(Cell::new(
        CellAddress::new(row, Slot::from_index(slot)?),
        CellContent {
            kind: CellKind::parse(kind)?,
            content,
        },
    ))
}

/// Bumps `updated_at`, failing with `NotFound` when the sheet does not exist.
fn touch(tx: &rusqlite::Transaction, sheet_id: SheetId) -> Result<(), StorageError> {
    let changed = tx.execute(
        &format!("UPDATE sheets SET updated_at = {NOW_MS} WHERE sheet_id = ?1"),
        rusqlite::params![sheet_id.as_bytes().as_slice()],
    )?;
    if changed == 0 {
        return Err(StorageError::NotFound(format!("sheet {sheet_id}")));
    }
    Ok(())
}

impl SqliteStorage {
    fn write_tx(&mut self) -> Result<rusqlite::Transaction<'_>, StorageError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl SheetStore for SqliteStorage {
    fn insert_sheet(&mut self, sheet_id: SheetId, meta: &SheetMeta) -> Result<(), StorageError> {
        let tx = self.write_tx()?;
        let result = tx.execute(
            "INSERT INTO sheets (sheet_id, customer_name, order_id, contact_person, notes) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                sheet_id.as_bytes().as_slice(),
                meta.customer_name,
                meta.order_id,
                meta.contact_person,
                meta.notes,
            ],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StorageError::SheetCollision {
                    sheet_id: sheet_id.to_string(),
                });
            }
            Err(e) => return Err(StorageError::Sqlite(e)),
        }
        tx.commit()?;
        Ok(())
    }

    fn get_sheet(&self, sheet_id: SheetId) -> Result<Option<SheetRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SHEET_COLUMNS} FROM sheets WHERE sheet_id = ?1"),
                rusqlite::params![sheet_id.as_bytes().as_slice()],
                sheet_row,
            )
            .optional()?;
        row.map(read_sheet).transpose()
    }

    fn list_sheets(&self) -> Result<Vec<SheetRecord>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SHEET_COLUMNS} FROM sheets ORDER BY created_at, sheet_id"
        ))?;
        let rows = stmt.query_map([], sheet_row)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(read_sheet(row?)?);
        }
        Ok(result)
    }

    fn get_cells(&self, sheet_id: SheetId) -> Result<Vec<Cell>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT row_index, slot, kind, content FROM cells WHERE sheet_id = ?1 ORDER BY row_index, slot",
        )?;
        let rows = stmt.query_map(rusqlite::params![sheet_id.as_bytes().as_slice()], |row| {
            let row_index: i64 = row.get(0)?;
            let slot: i64 = row.get(1)?;
            let kind: String = row.get(2)?;
            let content: String = row.get(3)?;
            Ok((row_index, slot, kind, content))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (row_index, slot, kind, content) = row?;
            result.push(read_cell(row_index, slot, &kind, content)?);
        }
        Ok(result)
    }

    fn upsert_cell(&mut self, sheet_id: SheetId, cell: &Cell) -> Result<(), StorageError> {
        let tx = self.write_tx()?;
        touch(&tx, sheet_id)?;
        tx.execute(
            "INSERT INTO cells (sheet_id, row_index, slot, kind, content) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(sheet_id, row_index, slot) DO UPDATE SET kind = excluded.kind, content = excluded.content",
            rusqlite::params![
                sheet_id.as_bytes().as_slice(),
                i64::from(cell.address.row),
                i64::from(cell.address.slot.index()),
                cell.content.kind.as_str(),
                cell.content.content,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_cell(
        &mut self,
        sheet_id: SheetId,
        address: CellAddress,
    ) -> Result<bool, StorageError> {
        let tx = self.write_tx()?;
        touch(&tx, sheet_id)?;
        let removed = tx.execute(
            "DELETE FROM cells WHERE sheet_id = ?1 AND row_index = ?2 AND slot = ?3",
            rusqlite::params![
                sheet_id.as_bytes().as_slice(),
                i64::from(address.row),
                i64::from(address.slot.index()),
            ],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn update_meta(&mut self, sheet_id: SheetId, patch: &MetaPatch) -> Result<(), StorageError> {
        let tx = self.write_tx()?;
        touch(&tx, sheet_id)?;
        for (field, value) in patch.iter() {
            // Column names come from the closed MetaField set, never from input.
            tx.execute(
                &format!("UPDATE sheets SET {} = ?1 WHERE sheet_id = ?2", field.column()),
                rusqlite::params![value, sheet_id.as_bytes().as_slice()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn set_stage(&mut self, sheet_id: SheetId, stage: Stage) -> Result<(), StorageError> {
        let tx = self.write_tx()?;
        touch(&tx, sheet_id)?;
        tx.execute(
            "UPDATE sheets SET stage = ?1 WHERE sheet_id = ?2",
            rusqlite::params![stage.as_str(), sheet_id.as_bytes().as_slice()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_with_sheet() -> Result<(SqliteStorage, SheetId), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        let sheet_id = SheetId::new();
        storage.insert_sheet(sheet_id, &SheetMeta::default())?;
        Ok((storage, sheet_id))
    }

    #[test]
    fn upsert_overwrites_kind_and_content_together() -> Result<(), StorageError> {
        let (mut storage, sheet_id) = storage_with_sheet()?;
        let address = CellAddress::new(0, Slot::Image);

        storage.upsert_cell(sheet_id, &Cell::new(address, CellContent::text("sketch")))?;
        storage.upsert_cell(sheet_id, &Cell::new(address, CellContent::image("/images/a.png")))?;

        let cells = storage.get_cells(sheet_id)?;
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].content, CellContent::image("/images/a.png"));
        Ok(())
    }

    #[test]
    fn writes_to_unknown_sheet_are_not_found() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        let cell = Cell::new(CellAddress::new(0, Slot::Name), CellContent::text("x"));
        assert!(matches!(
            storage.upsert_cell(SheetId::new(), &cell),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.set_stage(SheetId::new(), Stage::Approval),
            Err(StorageError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn duplicate_sheet_id_collides() -> Result<(), StorageError> {
        let (mut storage, sheet_id) = storage_with_sheet()?;
        assert!(matches!(
            storage.insert_sheet(sheet_id, &SheetMeta::default()),
            Err(StorageError::SheetCollision { .. })
        ));
        Ok(())
    }

    #[test]
    fn delete_cell_reports_whether_a_row_existed() -> Result<(), StorageError> {
        let (mut storage, sheet_id) = storage_with_sheet()?;
        let address = CellAddress::new(3, Slot::Notes);
        storage.upsert_cell(sheet_id, &Cell::new(address, CellContent::text("deburr")))?;

        assert!(storage.delete_cell(sheet_id, address)?);
        assert!(!storage.delete_cell(sheet_id, address)?);
        assert!(storage.get_cells(sheet_id)?.is_empty());
        Ok(())
    }

    #[test]
    fn meta_patch_only_touches_named_fields() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        let sheet_id = SheetId::new();
        let meta = SheetMeta {
            customer_name: "Acme".into(),
            order_id: "QUO-7".into(),
            ..SheetMeta::default()
        };
        storage.insert_sheet(sheet_id, &meta)?;

        let patch = MetaPatch::from_pairs([("notes", "ship by friday")])?;
        storage.update_meta(sheet_id, &patch)?;

        let record = storage.get_sheet(sheet_id)?.unwrap();
        assert_eq!(record.meta.customer_name, "Acme");
        assert_eq!(record.meta.order_id, "QUO-7");
        assert_eq!(record.meta.notes, "ship by friday");
        Ok(())
    }

    #[test]
    fn stage_round_trips() -> Result<(), StorageError> {
        let (mut storage, sheet_id) = storage_with_sheet()?;
        assert_eq!(storage.get_sheet(sheet_id)?.unwrap().stage, Stage::Quoting);
        storage.set_stage(sheet_id, Stage::Machining)?;
        assert_eq!(storage.get_sheet(sheet_id)?.unwrap().stage, Stage::Machining);
        Ok(())
    }

    #[test]
    fn cells_come_back_in_row_then_slot_order() -> Result<(), StorageError> {
        let (mut storage, sheet_id) = storage_with_sheet()?;
        for (row, slot) in [(2, Slot::Name), (0, Slot::Quantity), (0, Slot::Image)] {
            storage.upsert_cell(
                sheet_id,
                &Cell::new(CellAddress::new(row, slot), CellContent::text("v")),
            )?;
        }
        let order: Vec<_> = storage
            .get_cells(sheet_id)?
            .into_iter()
            .map(|c| (c.address.row, c.address.slot))
            .collect();
        assert_eq!(order, [(0, Slot::Image), (0, Slot::Quantity), (2, Slot::Name)]);
        Ok(())
    }
}
