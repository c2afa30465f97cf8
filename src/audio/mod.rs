//! Track alignment, gain and mixing.

/// Per-track truncate/loop, gain and summing.
pub mod mix;

pub use mix::{AudioDecode, AudioMixer, AudioTrackRef, FfmpegAudioDecoder};
