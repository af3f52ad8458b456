pub mod images;
pub mod sheets;
