//! Typed records shared by the writer, the run context and the live feed.
pub mod diagnostic;
pub mod event;
pub mod phase;
pub mod status;
pub mod summary;

pub use diagnostic::{Diagnostic, Severity};
pub use event::{Event, EventBody};
pub use phase::{Command, Phase};
pub use status::StatusSnapshot;
pub use summary::{Category, FailureSignals, FailureSummary};
