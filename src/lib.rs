//! Common functionality for the equitable retirement model.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod optimisation;
pub mod output;
pub mod plant;
pub mod settings;
pub mod site;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// On Linux, this should be `$HOME/.config/equitable-retirement`.
pub fn get_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("equitable-retirement");
    path
}
