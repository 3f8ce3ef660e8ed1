// Job listing sync pipeline - core library
//
// Pulls paginated postings from the mediere API, diffs them against the
// persisted baseline snapshot, and replicates new postings into the
// WordPress-style destination store (full wipe + reinsert per run).

pub mod baseline;
pub mod config;
pub mod destination;
pub mod diff;
pub mod pipeline;
pub mod source;
pub mod test_dependencies;
pub mod traits;

pub use config::*;
