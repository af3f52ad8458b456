use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Scalar header fields of an order sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetMeta {
    pub customer_name: String,
    pub order_id: String,
    pub contact_person: String,
    pub notes: String,
}

impl SheetMeta {
    pub fn set(&mut self, field: MetaField, value: String) {
        match field {
            MetaField::CustomerName => self.customer_name = value,
            MetaField::OrderId => self.order_id = value,
            MetaField::ContactPerson => self.contact_person = value,
            MetaField::Notes => self.notes = value,
        }
    }

    pub fn apply(&mut self, patch: &MetaPatch) {
        for (field, value) in patch.iter() {
            self.set(field, value.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetaField {
    CustomerName,
    OrderId,
    ContactPerson,
    Notes,
}

impl MetaField {
    pub const ALL: [MetaField; 4] = [
        MetaField::CustomerName,
        MetaField::OrderId,
        MetaField::ContactPerson,
        MetaField::Notes,
    ];

    /// Wire name, as sent by clients.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CustomerName => "customerName",
            Self::OrderId => "orderId",
            Self::ContactPerson => "contactPerson",
            Self::Notes => "notes",
        }
    }

    /// Storage column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CustomerName => "customer_name",
            Self::OrderId => "order_id",
            Self::ContactPerson => "contact_person",
            Self::Notes => "notes",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| CoreError::InvalidField(s.to_string()))
    }
}

/// A validated partial update of sheet metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetaPatch {
    fields: BTreeMap<MetaField, String>,
}

impl MetaPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every name before accepting any of them.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, CoreError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut patch = Self::new();
        for (key, value) in pairs {
            let field = MetaField::parse(key.as_ref())?;
            patch.fields.insert(field, value.into());
        }
        Ok(patch)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetaField, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Board column an order currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Quoting,
    Ordering,
    Approval,
    Outsourcing,
    Machining,
    Inspection,
    Shipping,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Quoting,
        Stage::Ordering,
        Stage::Approval,
        Stage::Outsourcing,
        Stage::Machining,
        Stage::Inspection,
        Stage::Shipping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quoting => "quoting",
            Self::Ordering => "ordering",
            Self::Approval => "approval",
            Self::Outsourcing => "outsourcing",
            Self::Machining => "machining",
            Self::Inspection => "inspection",
            Self::Shipping => "shipping",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| CoreError::InvalidData(format!("unknown stage: {s}")))
    }
}
