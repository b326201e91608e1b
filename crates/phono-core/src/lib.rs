//! Phono Core - Library engine for the Phono music player

pub mod config;
pub mod diff;
pub mod dsp;
pub mod library;
pub mod playlist;
pub mod queue;
pub mod search;
pub mod services;
pub mod types;

pub use types::*;
