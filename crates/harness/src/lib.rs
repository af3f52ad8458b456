mod bench;
mod fixtures;

pub use bench::TestBench;
pub use fixtures::{LineItem, demo_line_items, demo_meta};
