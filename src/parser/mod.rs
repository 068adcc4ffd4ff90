use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  district::{AreaId, DistrictCode},
  error::{ConfigurationError, Result},
  map::geometry::Feature,
};

mod geojson;
pub use geojson::GeoJsonSource;
mod topojson;
pub use topojson::TopoJsonSource;

/// Boundary geometry of all districts, keyed by district code.
pub trait GeometrySource {
  /// The features of one district, or `None` if the source has no entry for it.
  fn district_features(&self, code: &DistrictCode) -> Result<Option<Vec<Feature>>>;
}

/// The file formats a geometry source can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeometryFormat {
  /// A topology with one named object per district.
  #[default]
  #[value(name = "topojson")]
  TopoJson,
  /// An object mapping each district code to a feature collection.
  #[value(name = "geojson")]
  GeoJson,
}

impl GeometryFormat {
  /// Reads and parses the file at `path`.
  pub fn load(self, path: &Path) -> Result<Box<dyn GeometrySource>> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let value: Value = serde_json::from_str(&json).map_err(|source| ConfigurationError::Json {
      path: path.to_path_buf(),
      source,
    })?;
    log::debug!("Parsing {} as {self:?}", path.display());
    Ok(match self {
      GeometryFormat::TopoJson => Box::new(TopoJsonSource::from_value(value)?),
      GeometryFormat::GeoJson => Box::new(GeoJsonSource::from_value(value)?),
    })
  }
}

/// A feature identifier given as string or number.
fn feature_id(id: Option<&Value>) -> Option<AreaId> {
  match id? {
    Value::String(s) => Some(AreaId::new(s.clone())),
    Value::Number(n) => Some(AreaId::new(n.to_string())),
    _ => None,
  }
}

/// The identifier of the `index`th feature of `code`, synthesized when the data has none.
fn feature_id_or_index(id: Option<&Value>, code: &DistrictCode, index: usize) -> AreaId {
  feature_id(id).unwrap_or_else(|| {
    log::warn!("Feature {index} of district {code} has no id");
    AreaId::new(format!("{code}-{index}"))
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn ids_from_strings_and_numbers() {
    assert_eq!(feature_id(Some(&json!("A01"))), Some(AreaId::from("A01")));
    assert_eq!(feature_id(Some(&json!(7))), Some(AreaId::from("7")));
    assert_eq!(feature_id(Some(&json!(null))), None);

    let code = DistrictCode::new("B").unwrap();
    assert_eq!(feature_id_or_index(None, &code, 3), AreaId::from("B-3"));
  }

  #[test]
  fn load_reports_missing_file() {
    let err = GeometryFormat::TopoJson
      .load(Path::new("/nonexistent/dcca.topojson"))
      .err()
      .unwrap();
    assert!(matches!(err, ConfigurationError::Io { .. }));
  }
}
