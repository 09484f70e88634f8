pub mod discovery;
pub mod error;
pub mod raw_table;
pub mod reader;

pub use discovery::{QuarterFolder, discover_quarters, find_ascii_dir, resolve_table_files};
pub use error::{IngestError, Result};
pub use raw_table::{ColumnData, RawTable, RawTableBuilder};
pub use reader::{ReadOptions, read_table};
