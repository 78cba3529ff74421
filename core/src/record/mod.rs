//! Status snapshot and event log on disk.
pub mod paths;
pub mod reader;
pub mod tail;
pub mod writer;

pub use paths::RecordPaths;
pub use reader::{read_events, read_raw, read_snapshot, EventTail};
pub use tail::{last_events, one_line_event};
pub use writer::{append_event, reset_log, try_append_event, try_write_snapshot, write_snapshot};
