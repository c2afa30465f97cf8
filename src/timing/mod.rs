//! Frame-accurate looping and trimming to a target length.

/// Pull loop that loops or truncates a source to a target frame count.
pub mod sync;

pub use sync::{DurationSynchronizer, SyncTarget, SyncedFrame};
