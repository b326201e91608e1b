//! Configuration for the phono library engine
//!
//! Provides:
//!
//! - Generic YAML config loading/saving
//! - Default path resolution for the config file and library snapshot
//! - The library configuration itself (roots, extensions, watch behavior,
//!   ReplayGain settings)

mod io;
mod library;
mod paths;

pub use io::{load_config, save_config};
pub use library::LibraryConfig;
pub use paths::{default_config_path, default_library_root, default_snapshot_path};
