use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort mounting the map. Nothing after a successful mount can fail.
#[derive(Error, Debug)]
pub enum ConfigurationError {
  #[error("Palette has {palette} colors but {codes} district codes are in use.")]
  PaletteTooSmall { palette: usize, codes: usize },
  #[error("District code {code} maps to color index {index} outside a palette of {palette}.")]
  CodeOutsidePalette {
    code: String,
    index: usize,
    palette: usize,
  },
  #[error("Invalid district code: {0:?}")]
  InvalidDistrictCode(String),
  #[error("No boundary geometry for district {0}.")]
  MissingGeometry(String),
  #[error("Malformed geometry source: {0}")]
  MalformedGeometry(String),
  #[error("Invalid palette color: {0:?}")]
  InvalidColor(String),
  #[error("Failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Failed to parse {path}: {source}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;
