use serde_json::{Map, Value};

use super::{GeometrySource, feature_id_or_index};
use crate::{
  district::DistrictCode,
  error::{ConfigurationError, Result},
  map::{
    coordinates::WGS84Coordinate,
    geometry::{Feature, Geometry, Ring},
  },
};

/// `GeoJSON` boundaries as an object mapping each district code to a `FeatureCollection`.
pub struct GeoJsonSource {
  districts: Map<String, Value>,
}

impl GeoJsonSource {
  pub fn from_json_str(json: &str) -> Result<Self> {
    let value = serde_json::from_str(json)
      .map_err(|e| ConfigurationError::MalformedGeometry(e.to_string()))?;
    Self::from_value(value)
  }

  pub fn from_value(value: Value) -> Result<Self> {
    let Value::Object(districts) = value else {
      return Err(ConfigurationError::MalformedGeometry(
        "GeoJSON districts must be an object keyed by district code".to_string(),
      ));
    };
    log::debug!("GeoJSON with {} districts", districts.len());
    Ok(Self { districts })
  }

  /// Parse the features of a `FeatureCollection` or a single `Feature`.
  fn parse_features(code: &DistrictCode, value: &Value) -> Result<Vec<Feature>> {
    let obj = value.as_object().ok_or_else(|| {
      ConfigurationError::MalformedGeometry(format!("District {code} must be a GeoJSON object"))
    })?;
    match obj.get("type").and_then(Value::as_str) {
      Some("FeatureCollection") => Ok(
        obj
          .get("features")
          .and_then(Value::as_array)
          .map(Vec::as_slice)
          .unwrap_or_default()
          .iter()
          .enumerate()
          .filter_map(|(index, feature)| Self::parse_feature(code, index, feature))
          .collect(),
      ),
      Some("Feature") => Ok(Self::parse_feature(code, 0, value).into_iter().collect()),
      Some(other) => Err(ConfigurationError::MalformedGeometry(format!(
        "Unexpected GeoJSON type {other} for district {code}"
      ))),
      None => Err(ConfigurationError::MalformedGeometry(format!(
        "Missing 'type' field for district {code}"
      ))),
    }
  }

  /// Parse a `GeoJSON` Feature, taking its id from `id` or `properties.id`.
  fn parse_feature(code: &DistrictCode, index: usize, feature: &Value) -> Option<Feature> {
    let obj = feature.as_object()?;
    let Some(geometry) = obj.get("geometry").and_then(Self::parse_geometry) else {
      log::warn!("Skipping feature {index} of district {code} without polygon geometry");
      return None;
    };
    let id = obj
      .get("id")
      .or_else(|| obj.get("properties")?.get("id"));
    Some(Feature::new(feature_id_or_index(id, code, index), geometry))
  }

  /// Parse `Polygon`, `MultiPolygon` and `GeometryCollection` geometries. Anything else is skipped.
  fn parse_geometry(geometry: &Value) -> Option<Geometry> {
    let obj = geometry.as_object()?;
    match obj.get("type")?.as_str()? {
      "Polygon" => Self::parse_polygon(obj.get("coordinates")?),
      "MultiPolygon" => {
        let polygons: Vec<_> = obj
          .get("coordinates")?
          .as_array()?
          .iter()
          .filter_map(Self::parse_polygon)
          .collect();
        (!polygons.is_empty()).then_some(Geometry::GeometryCollection(polygons))
      }
      "GeometryCollection" => {
        let geometries: Vec<_> = obj
          .get("geometries")?
          .as_array()?
          .iter()
          .filter_map(Self::parse_geometry)
          .collect();
        (!geometries.is_empty()).then_some(Geometry::GeometryCollection(geometries))
      }
      _ => None,
    }
  }

  /// Parse the rings of a polygon, exterior first. Rings with fewer than three points are dropped.
  fn parse_polygon(coordinates: &Value) -> Option<Geometry> {
    let rings: Vec<Ring> = coordinates
      .as_array()?
      .iter()
      .filter_map(Self::parse_coordinate_array)
      .filter(|ring| ring.len() >= 3)
      .collect();
    (!rings.is_empty()).then_some(Geometry::Polygon(rings))
  }

  /// Parse a single coordinate [lon, lat] or [lon, lat, elevation]. Out of range values are dropped.
  fn parse_coordinate(coord: &Value) -> Option<WGS84Coordinate> {
    if let Some(array) = coord.as_array()
      && array.len() >= 2
    {
      let lon = array[0].as_f64()?;
      let lat = array[1].as_f64()?;
      return Some(WGS84Coordinate::new(lat, lon)).filter(WGS84Coordinate::is_valid);
    }
    None
  }

  /// Parse an array of coordinates [[lon, lat], [lon, lat], ...]
  fn parse_coordinate_array(coords: &Value) -> Option<Ring> {
    coords
      .as_array()
      .map(|array| array.iter().filter_map(Self::parse_coordinate).collect())
  }
}

impl GeometrySource for GeoJsonSource {
  fn district_features(&self, code: &DistrictCode) -> Result<Option<Vec<Feature>>> {
    self
      .districts
      .get(code.as_str())
      .map(|value| Self::parse_features(code, value))
      .transpose()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::district::AreaId;

  const DISTRICTS: &str = r#"{
    "A": {
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "id": "A01",
          "geometry": {
            "type": "Polygon",
            "coordinates": [
              [[114.0, 22.0], [115.0, 22.0], [115.0, 23.0], [114.0, 23.0], [114.0, 22.0]],
              [[114.4, 22.4], [114.6, 22.4], [114.6, 22.6], [114.4, 22.6], [114.4, 22.4]]
            ]
          }
        },
        {
          "type": "Feature",
          "properties": {"id": "A02"},
          "geometry": {
            "type": "MultiPolygon",
            "coordinates": [
              [[[116.0, 22.0], [117.0, 22.0], [117.0, 23.0], [116.0, 22.0]]],
              [[[118.0, 22.0], [119.0, 22.0], [119.0, 23.0], [118.0, 22.0]]]
            ]
          }
        },
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [114.0, 22.0]}},
        {
          "type": "Feature",
          "properties": {},
          "geometry": {
            "type": "Polygon",
            "coordinates": [[[120.0, 22.0], [121.0, 22.0], [121.0, 23.0], [120.0, 22.0]]]
          }
        }
      ]
    },
    "B": {
      "type": "Feature",
      "id": 7,
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[114.0, 22.0], [115.0, 22.0], [115.0, 23.0], [114.0, 22.0]]]
      }
    },
    "C": {"type": "Point", "coordinates": [114.0, 22.0]}
  }"#;

  fn code(c: &str) -> DistrictCode {
    DistrictCode::new(c).unwrap()
  }

  #[test]
  fn feature_collection_per_district() {
    let source = GeoJsonSource::from_json_str(DISTRICTS).unwrap();
    let features = source.district_features(&code("A")).unwrap().unwrap();
    let ids: Vec<_> = features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["A01", "A02", "A-3"]);
    assert_eq!(features[1].geometry.polygons().count(), 2);
  }

  #[test]
  fn polygon_holes_are_kept() {
    let source = GeoJsonSource::from_json_str(DISTRICTS).unwrap();
    let features = source.district_features(&code("A")).unwrap().unwrap();
    let geometry = &features[0].geometry;
    assert!(geometry.contains(WGS84Coordinate::new(22.2, 114.2)));
    assert!(!geometry.contains(WGS84Coordinate::new(22.5, 114.5)));
  }

  #[test]
  fn single_feature_with_numeric_id() {
    let source = GeoJsonSource::from_json_str(DISTRICTS).unwrap();
    let features = source.district_features(&code("B")).unwrap().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].id, AreaId::from("7"));
  }

  #[test]
  fn missing_and_malformed_districts() {
    let source = GeoJsonSource::from_json_str(DISTRICTS).unwrap();
    assert!(source.district_features(&code("D")).unwrap().is_none());
    assert!(matches!(
      source.district_features(&code("C")),
      Err(ConfigurationError::MalformedGeometry(_))
    ));
  }

  #[test]
  fn top_level_must_be_an_object() {
    assert!(GeoJsonSource::from_json_str("[]").is_err());
    assert!(GeoJsonSource::from_json_str("{").is_err());
  }
}
