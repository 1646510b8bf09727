//! Shared foundation for the Mirage video-synthesis backend.
//!
//! Holds the types every other crate agrees on: database ID aliases,
//! environment configuration, the tagged [`path::StoragePath`] value,
//! and ffprobe-based media inspection.

pub mod config;
pub mod ffmpeg;
pub mod path;
pub mod types;
