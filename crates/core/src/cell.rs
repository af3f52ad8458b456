use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Text,
    Image,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(CoreError::InvalidData(format!("unknown cell kind: {s}"))),
        }
    }
}

/// What a cell holds: literal text, or a reference path to a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellContent {
    pub kind: CellKind,
    pub content: String,
}

impl CellContent {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Text,
            content: content.into(),
        }
    }

    pub fn image(path: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Image,
            content: path.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.kind == CellKind::Text && self.content.is_empty()
    }
}

/// Stored line-item columns. The discriminant is the storage index and must
/// never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Image = 0,
    Name = 1,
    Material = 2,
    Quantity = 3,
    SurfaceTreatment = 4,
    Notes = 5,
    Outsourced = 6,
    UnitPrice = 7,
    ProcessMethod = 8,
    ToleranceNotes = 9,
}

impl Slot {
    pub const ALL: [Slot; 10] = [
        Slot::Image,
        Slot::Name,
        Slot::Material,
        Slot::Quantity,
        Slot::SurfaceTreatment,
        Slot::Notes,
        Slot::Outsourced,
        Slot::UnitPrice,
        Slot::ProcessMethod,
        Slot::ToleranceNotes,
    ];

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: i64) -> Result<Self, CoreError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| CoreError::InvalidAddress(format!("no stored column at index {index}")))
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Name => "name",
            Self::Material => "material",
            Self::Quantity => "quantity",
            Self::SurfaceTreatment => "surfaceTreatment",
            Self::Notes => "notes",
            Self::Outsourced => "outsourced",
            Self::UnitPrice => "unitPrice",
            Self::ProcessMethod => "processMethod",
            Self::ToleranceNotes => "toleranceNotes",
        }
    }
}

/// Rows per sheet. Row indices run from 0 to `MAX_ROWS - 1`.
pub const MAX_ROWS: u32 = 10_000;

/// Rejects a row index at or past [`MAX_ROWS`].
pub fn check_row(row: u32) -> Result<u32, CoreError> {
    if row < MAX_ROWS {
        Ok(row)
    } else {
        Err(CoreError::InvalidAddress(format!(
            "row {row} is past the last row {}",
            MAX_ROWS - 1
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub slot: Slot,
}

impl CellAddress {
    pub fn new(row: u32, slot: Slot) -> Self {
        Self { row, slot }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub address: CellAddress,
    #[serde(flatten)]
    pub content: CellContent,
}

impl Cell {
    pub fn new(address: CellAddress, content: CellContent) -> Self {
        Self { address, content }
    }
}

/// Sparse in-memory index over one sheet's persisted cells.
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
    cells: BTreeMap<(u32, Slot), CellContent>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut grid = Self::new();
        for cell in cells {
            grid.insert(cell.clone());
        }
        grid
    }

    pub fn insert(&mut self, cell: Cell) {
        self.cells
            .insert((cell.address.row, cell.address.slot), cell.content);
    }

    pub fn get(&self, row: u32, slot: Slot) -> Option<&CellContent> {
        self.cells.get(&(row, slot))
    }

    /// Content at an address, or the sparse default (empty text).
    pub fn resolve(&self, row: u32, slot: Slot) -> CellContent {
        self.get(row, slot).cloned().unwrap_or_default()
    }

    /// One past the highest stored row index, or 0 for an empty sheet.
    pub fn row_count(&self) -> u32 {
        self.cells
            .keys()
            .map(|(row, _)| row.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
