//! CLI command handlers, one per file.

mod batch;
mod derive;
mod get;
mod records;
mod scan;

pub use batch::{run_batch, BatchSource};
pub use derive::run_derive;
pub use get::run_get;
pub use records::{run_records, RecordsAction};
pub use scan::run_scan;
