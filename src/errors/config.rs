// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading module configuration files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a module configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Unable to read module configuration '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML
    #[error("Invalid module configuration{}: {source}", origin_suffix(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    /// A top-level entry is not a table of parameters
    #[error("Module configuration entry '{section}' must be a table of parameters")]
    InvalidSection { section: String },

    /// A float parameter is `nan` or infinite
    #[error("Parameter '{parameter}' of module '{section}' must be a finite number")]
    NonFiniteNumber { section: String, parameter: String },
}

fn origin_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" '{}'", path.display()),
        None => String::new(),
    }
}
