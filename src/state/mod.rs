//! State module for the harvest data model
//!
//! # Components
//!
//! - `CrawlState`: the pagination state machine for one source
//! - `Source`, `Record`, `FieldValue`: what is crawled and what is extracted
//! - `Outcome`: the result of one document download

mod crawl_state;
mod outcome;
mod record;

// Re-export main types
pub use crawl_state::CrawlState;
pub use outcome::{Outcome, TaskOutcome};
pub use record::{FieldValue, Record, RecordContext, Source, NOT_FOUND, RESERVED_COLUMNS};
