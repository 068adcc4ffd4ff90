use std::path::PathBuf;

use dirs::home_dir;
use log::error;

use crate::{color::DEFAULT_PALETTE, map::coordinates::WGS84Coordinate, parser::GeometryFormat};

/// Center of Hong Kong, between the harbour and the New Territories.
pub const DEFAULT_CENTER: WGS84Coordinate = WGS84Coordinate {
  lat: 22.3300,
  lon: 114.1880,
};
pub const DEFAULT_ZOOM: u8 = 11;
/// Traditional Chinese names.
pub const DEFAULT_LOCALE: &str = "T";

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
  pub config_path: Option<PathBuf>,
  pub geometry_path: Option<PathBuf>,
  pub geometry_format: Option<GeometryFormat>,
  pub district_names_path: Option<PathBuf>,
  pub area_names_path: Option<PathBuf>,
  pub locale: Option<String>,
  pub center: Option<WGS84Coordinate>,
  pub zoom: Option<u8>,
  pub palette: Option<Vec<String>>,
}

impl Config {
  /// Environment first, then the config file, then the defaults.
  #[must_use]
  pub fn new() -> Self {
    let from_env = Self::from_env();
    let from_file = Self::from_file();

    let mut merged = from_env;
    if let Some(from_file) = &from_file {
      merged = merged.merge(from_file);
    }
    merged = merged.merge(&Self::defaults());

    if merged.config_path.is_some() && from_file.is_none() {
      merged.init_cfg_file();
    }

    merged
  }

  fn from_env() -> Self {
    Self {
      config_path: std::env::var("DCCAMAP_CONFIG").ok().map(PathBuf::from),
      geometry_path: std::env::var("DCCAMAP_GEOMETRY").ok().map(PathBuf::from),
      locale: std::env::var("DCCAMAP_LOCALE").ok(),
      ..Self::default()
    }
  }

  /// Fields set in `self` win over those of `other`.
  #[must_use]
  pub fn merge(mut self, other: &Self) -> Self {
    self.config_path = self.config_path.or(other.config_path.clone());
    self.geometry_path = self.geometry_path.or(other.geometry_path.clone());
    self.geometry_format = self.geometry_format.or(other.geometry_format);
    self.district_names_path = self
      .district_names_path
      .or(other.district_names_path.clone());
    self.area_names_path = self.area_names_path.or(other.area_names_path.clone());
    self.locale = self.locale.or(other.locale.clone());
    self.center = self.center.or(other.center);
    self.zoom = self.zoom.or(other.zoom);
    self.palette = self.palette.or(other.palette.clone());
    self
  }

  fn from_file() -> Option<Self> {
    let config_path = std::env::var("DCCAMAP_CONFIG")
      .ok()
      .map(PathBuf::from)
      .or_else(default_config_dir)?;
    let config_path = config_path.join("config.json");

    serde_json::from_str(&std::fs::read_to_string(&config_path).ok()?)
      .inspect_err(|e| error!("Failed to read config file: {e}"))
      .ok()?
  }

  fn init_cfg_file(&self) {
    let Some(path) = &self.config_path else {
      return;
    };
    if !path.exists() {
      let _ = std::fs::create_dir_all(path).inspect_err(|e| {
        error!("Failed to create config directory: {e}");
      });
    }

    let path = path.join("config.json");
    if !path.exists() {
      let config = serde_json::to_string_pretty(self);
      if let Ok(config) = config {
        let _ = std::fs::write(path, config).inspect_err(|e| {
          error!("Failed to write config file: {e}");
        });
      } else {
        error!("Failed to serialize config");
      }
    }
  }

  /// The values used when neither environment nor config file set a field.
  #[must_use]
  pub fn defaults() -> Self {
    let config_path = default_config_dir();
    let data_dir = config_path.as_ref().map(|p| p.join("data"));
    Self {
      geometry_path: data_dir.as_ref().map(|p| p.join("2011dcca.topojson")),
      geometry_format: Some(GeometryFormat::default()),
      district_names_path: data_dir.as_ref().map(|p| p.join("districts_name.json")),
      area_names_path: data_dir.as_ref().map(|p| p.join("dcca_name.json")),
      config_path,
      locale: Some(DEFAULT_LOCALE.to_string()),
      center: Some(DEFAULT_CENTER),
      zoom: Some(DEFAULT_ZOOM),
      palette: Some(DEFAULT_PALETTE.iter().map(ToString::to_string).collect()),
    }
  }

  #[must_use]
  pub fn locale(&self) -> &str {
    self.locale.as_deref().unwrap_or(DEFAULT_LOCALE)
  }

  #[must_use]
  pub fn center(&self) -> WGS84Coordinate {
    self.center.unwrap_or(DEFAULT_CENTER)
  }

  #[must_use]
  pub fn zoom(&self) -> u8 {
    self.zoom.unwrap_or(DEFAULT_ZOOM)
  }

  #[must_use]
  pub fn geometry_format(&self) -> GeometryFormat {
    self.geometry_format.unwrap_or_default()
  }

  /// The configured palette as strings, falling back to the built-in one.
  #[must_use]
  pub fn palette(&self) -> Vec<&str> {
    self.palette.as_ref().map_or_else(
      || DEFAULT_PALETTE.to_vec(),
      |palette| palette.iter().map(String::as_str).collect(),
    )
  }
}

fn default_config_dir() -> Option<PathBuf> {
  home_dir().map(|p| p.join(".config").join("dccamap"))
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;

  #[test]
  fn set_fields_win_over_merged_ones() {
    let env = Config {
      locale: Some("E".to_string()),
      geometry_path: Some(PathBuf::from("/tmp/env.topojson")),
      ..Config::default()
    };
    let file = Config {
      locale: Some("S".to_string()),
      zoom: Some(13),
      ..Config::default()
    };
    let merged = env.merge(&file).merge(&Config::defaults());

    assert_eq!(merged.locale(), "E");
    assert_eq!(merged.zoom(), 13);
    assert_eq!(
      merged.geometry_path.as_deref(),
      Some(Path::new("/tmp/env.topojson"))
    );
    assert_eq!(merged.center(), DEFAULT_CENTER);
    assert_eq!(merged.palette().len(), DEFAULT_PALETTE.len());
  }

  #[test]
  fn empty_config_uses_built_in_values() {
    let config = Config::default();
    assert_eq!(config.locale(), "T");
    assert_eq!(config.zoom(), 11);
    assert_eq!(config.geometry_format(), GeometryFormat::TopoJson);
    assert_eq!(config.palette(), DEFAULT_PALETTE.to_vec());
  }

  #[test]
  fn partial_config_file_deserializes() {
    let config: Config = serde_json::from_str(
      r#"{"zoom": 12, "center": {"lat": 22.28, "lng": 114.16}, "geometry_format": "geojson"}"#,
    )
    .unwrap();
    assert_eq!(config.zoom(), 12);
    assert_eq!(config.center(), WGS84Coordinate::new(22.28, 114.16));
    assert_eq!(config.geometry_format(), GeometryFormat::GeoJson);
    assert!(config.locale.is_none());
  }
}
