//! Core types and traits for the vecol virtual ecologist.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! vocabulary shared across the workspace: observation rows and tables,
//! survey sites and observer sessions, the loosely typed input table,
//! error types, and the progress/cancellation seams.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod progress;
pub mod record;
pub mod table;

pub use error::{LookupError, ObserveError, ValidationError};
pub use progress::{CancelToken, NoProgress, ProgressFn, ProgressSink};
pub use record::{ObservationRecord, ObservationTable, ObserverSession, SamplePoint, Site};
pub use table::{Column, RawTable};
