//! Encoding sinks and final muxing.
//!
//! Sinks consume composited frames in output order; the silent video is muxed with the
//! mixed audio afterwards.

/// `ffmpeg`-based sink and encoder negotiation.
pub mod ffmpeg;
/// Audio/video muxing of the finished job.
pub mod mux;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
