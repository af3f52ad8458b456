//! Named column layouts over the stored line-item slots.
//!
//! Every read and write path resolves logical columns through the tables in
//! this module; nothing else maps view positions to slots.

use serde::{Deserialize, Serialize};

use crate::cell::Slot;
use crate::error::CoreError;

/// Values computed at read time from sibling columns of the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derived {
    /// quantity × unit price
    TotalPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Stored(Slot),
    Derived(Derived),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub header: &'static str,
    pub source: Source,
}

impl ColumnSpec {
    const fn stored(key: &'static str, header: &'static str, slot: Slot) -> Self {
        Self {
            key,
            header,
            source: Source::Stored(slot),
        }
    }

    const fn derived(key: &'static str, header: &'static str, derived: Derived) -> Self {
        Self {
            key,
            header,
            source: Source::Derived(derived),
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self.source {
            Source::Stored(slot) => Some(slot),
            Source::Derived(_) => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.source, Source::Derived(_))
    }
}

const IMAGE: ColumnSpec = ColumnSpec::stored("image", "Image", Slot::Image);
const NAME: ColumnSpec = ColumnSpec::stored("name", "Name", Slot::Name);
const MATERIAL: ColumnSpec = ColumnSpec::stored("material", "Material", Slot::Material);
const QUANTITY: ColumnSpec = ColumnSpec::stored("quantity", "Quantity", Slot::Quantity);
const SURFACE_TREATMENT: ColumnSpec =
    ColumnSpec::stored("surfaceTreatment", "Surface Treatment", Slot::SurfaceTreatment);
const NOTES: ColumnSpec = ColumnSpec::stored("notes", "Notes", Slot::Notes);
const OUTSOURCED: ColumnSpec = ColumnSpec::stored("outsourced", "Outsourced", Slot::Outsourced);
const UNIT_PRICE: ColumnSpec = ColumnSpec::stored("unitPrice", "Unit Price", Slot::UnitPrice);
const TOTAL_PRICE: ColumnSpec =
    ColumnSpec::derived("totalPrice", "Total Price", Derived::TotalPrice);
const PROCESS_METHOD: ColumnSpec =
    ColumnSpec::stored("processMethod", "Process Method", Slot::ProcessMethod);
const TOLERANCE_NOTES: ColumnSpec =
    ColumnSpec::stored("toleranceNotes", "Tolerance Notes", Slot::ToleranceNotes);

// The outsourced flag trails the first three layouts so the leading columns
// keep the same positions in every view.
const SHIPPING_COLUMNS: &[ColumnSpec] = &[
    IMAGE,
    NAME,
    MATERIAL,
    QUANTITY,
    SURFACE_TREATMENT,
    NOTES,
    OUTSOURCED,
];

const QUOTATION_COLUMNS: &[ColumnSpec] = &[
    IMAGE,
    NAME,
    MATERIAL,
    QUANTITY,
    SURFACE_TREATMENT,
    NOTES,
    UNIT_PRICE,
    TOTAL_PRICE,
    OUTSOURCED,
];

const PRODUCTION_COLUMNS: &[ColumnSpec] = &[
    IMAGE,
    NAME,
    MATERIAL,
    QUANTITY,
    SURFACE_TREATMENT,
    NOTES,
    PROCESS_METHOD,
    TOLERANCE_NOTES,
    OUTSOURCED,
];

const OUTSOURCING_COLUMNS: &[ColumnSpec] = &[
    IMAGE,
    NAME,
    MATERIAL,
    SURFACE_TREATMENT,
    QUANTITY,
    UNIT_PRICE,
    TOTAL_PRICE,
];

/// Literal flag content that marks a row for outsourcing.
pub const OUTSOURCED_FLAG: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[serde(alias = "base")]
    Shipping,
    Quotation,
    Production,
    Outsourcing,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Shipping,
        View::Quotation,
        View::Production,
        View::Outsourcing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Quotation => "quotation",
            Self::Production => "production",
            Self::Outsourcing => "outsourcing",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "shipping" | "base" => Ok(Self::Shipping),
            "quotation" => Ok(Self::Quotation),
            "production" => Ok(Self::Production),
            "outsourcing" => Ok(Self::Outsourcing),
            _ => Err(CoreError::InvalidData(format!("unknown view: {s}"))),
        }
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            Self::Shipping => SHIPPING_COLUMNS,
            Self::Quotation => QUOTATION_COLUMNS,
            Self::Production => PRODUCTION_COLUMNS,
            Self::Outsourcing => OUTSOURCING_COLUMNS,
        }
    }

    pub fn column(&self, index: usize) -> Result<&'static ColumnSpec, CoreError> {
        self.columns().get(index).ok_or_else(|| {
            CoreError::InvalidAddress(format!(
                "view {} has {} columns, got column {index}",
                self.as_str(),
                self.columns().len()
            ))
        })
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.header).collect()
    }

    /// Slot whose content must equal [`OUTSOURCED_FLAG`] for a row to appear.
    pub fn row_filter(&self) -> Option<Slot> {
        match self {
            Self::Outsourcing => Some(Slot::Outsourced),
            _ => None,
        }
    }
}
