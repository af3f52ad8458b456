pub mod cell;
pub mod error;
pub mod ids;
pub mod image;
pub mod meta;
pub mod projection;
pub mod view;

pub use cell::{Cell, CellAddress, CellContent, CellGrid, CellKind, MAX_ROWS, Slot, check_row};
pub use error::CoreError;
pub use ids::*;
pub use meta::{MetaField, MetaPatch, SheetMeta, Stage};
pub use projection::{ProjectedRow, Projection, project, unproject};
pub use view::{ColumnSpec, View};
