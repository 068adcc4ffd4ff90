use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::{GeometrySource, feature_id_or_index};
use crate::{
  district::DistrictCode,
  error::{ConfigurationError, Result},
  map::{
    coordinates::WGS84Coordinate,
    geometry::{Feature, Geometry, Ring},
  },
};

#[derive(Deserialize)]
struct Topology {
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  transform: Option<Quantization>,
  #[serde(default)]
  arcs: Vec<Vec<Vec<f64>>>,
  #[serde(default)]
  objects: HashMap<String, TopoGeometry>,
}

/// Delta-encoded integer positions are scaled and translated back to degrees.
#[derive(Deserialize)]
struct Quantization {
  scale: [f64; 2],
  translate: [f64; 2],
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum TopoGeometry {
  GeometryCollection {
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
  },
  Polygon {
    #[serde(default)]
    id: Option<Value>,
    arcs: Vec<Vec<i64>>,
  },
  MultiPolygon {
    #[serde(default)]
    id: Option<Value>,
    arcs: Vec<Vec<Vec<i64>>>,
  },
  #[serde(other)]
  Unsupported,
}

impl TopoGeometry {
  /// Collects the non-collection geometries, descending into nested collections in order.
  fn flatten_into<'a>(&'a self, members: &mut Vec<&'a TopoGeometry>) {
    match self {
      Self::GeometryCollection { geometries } => {
        for geometry in geometries {
          geometry.flatten_into(members);
        }
      }
      geometry => members.push(geometry),
    }
  }
}

/// A closed ring around an area has at least three distinct positions plus the closing one.
const MIN_RING_LEN: usize = 4;

/// A TopoJSON topology holding one named object per district.
pub struct TopoJsonSource {
  arcs: Vec<Ring>,
  objects: HashMap<String, TopoGeometry>,
}

impl TopoJsonSource {
  pub fn from_json_str(json: &str) -> Result<Self> {
    let value = serde_json::from_str(json)
      .map_err(|e| ConfigurationError::MalformedGeometry(e.to_string()))?;
    Self::from_value(value)
  }

  pub fn from_value(value: Value) -> Result<Self> {
    let topology: Topology = serde_json::from_value(value)
      .map_err(|e| ConfigurationError::MalformedGeometry(format!("Invalid topology: {e}")))?;
    if topology.kind != "Topology" {
      return Err(ConfigurationError::MalformedGeometry(format!(
        "Expected a Topology, found {}",
        topology.kind
      )));
    }
    let arcs = decode_arcs(topology.arcs, topology.transform.as_ref())?;
    log::debug!(
      "Topology with {} arcs and {} objects",
      arcs.len(),
      topology.objects.len()
    );
    Ok(Self {
      arcs,
      objects: topology.objects,
    })
  }

  /// Stitches arcs into a ring. Negative indices refer to reversed arcs (`!index`).
  /// Rings too short to enclose an area are `None`.
  fn ring(&self, indices: &[i64]) -> Result<Option<Ring>> {
    let mut ring = Ring::new();
    for &index in indices {
      let (arc_index, reversed) = if index < 0 {
        (!index, true)
      } else {
        (index, false)
      };
      let arc = usize::try_from(arc_index)
        .ok()
        .and_then(|i| self.arcs.get(i))
        .ok_or_else(|| {
          ConfigurationError::MalformedGeometry(format!("Arc {index} does not exist"))
        })?;
      // Consecutive arcs share their end and start point.
      ring.pop();
      if reversed {
        ring.extend(arc.iter().rev().copied());
      } else {
        ring.extend(arc.iter().copied());
      }
    }
    if ring.len() < MIN_RING_LEN {
      log::warn!("Dropping degenerate ring of {} positions from arcs {indices:?}", ring.len());
      return Ok(None);
    }
    Ok(Some(ring))
  }

  /// A polygon without a usable exterior ring is `None`. Degenerate holes are dropped.
  fn polygon(&self, rings: &[Vec<i64>]) -> Result<Option<Geometry>> {
    let mut rings = rings
      .iter()
      .map(|indices| self.ring(indices))
      .collect::<Result<Vec<_>>>()?
      .into_iter();
    let Some(Some(exterior)) = rings.next() else {
      return Ok(None);
    };
    Ok(Some(Geometry::Polygon(
      std::iter::once(exterior).chain(rings.flatten()).collect(),
    )))
  }

  fn feature(
    &self,
    code: &DistrictCode,
    index: usize,
    geometry: &TopoGeometry,
  ) -> Result<Option<Feature>> {
    let (id, geometry) = match geometry {
      TopoGeometry::Polygon { id, arcs } => (id, self.polygon(arcs)?),
      TopoGeometry::MultiPolygon { id, arcs } => {
        let polygons = arcs
          .iter()
          .filter_map(|polygon| self.polygon(polygon).transpose())
          .collect::<Result<Vec<_>>>()?;
        (
          id,
          (!polygons.is_empty()).then_some(Geometry::GeometryCollection(polygons)),
        )
      }
      TopoGeometry::GeometryCollection { .. } | TopoGeometry::Unsupported => {
        log::debug!("Skipping non-polygon geometry {index} of district {code}");
        return Ok(None);
      }
    };
    let Some(geometry) = geometry else {
      log::warn!("Skipping geometry {index} of district {code} without an enclosed area");
      return Ok(None);
    };
    Ok(Some(Feature::new(
      feature_id_or_index(id.as_ref(), code, index),
      geometry,
    )))
  }
}

impl GeometrySource for TopoJsonSource {
  fn district_features(&self, code: &DistrictCode) -> Result<Option<Vec<Feature>>> {
    let Some(object) = self.objects.get(code.as_str()) else {
      return Ok(None);
    };
    let mut members = Vec::new();
    object.flatten_into(&mut members);
    let features = members
      .into_iter()
      .enumerate()
      .filter_map(|(index, geometry)| self.feature(code, index, geometry).transpose())
      .collect::<Result<Vec<_>>>()?;
    Ok(Some(features))
  }
}

/// Turns the topology's arcs into absolute coordinates.
fn decode_arcs(arcs: Vec<Vec<Vec<f64>>>, transform: Option<&Quantization>) -> Result<Vec<Ring>> {
  arcs
    .into_iter()
    .map(|arc| {
      let (mut x, mut y) = (0f64, 0f64);
      arc
        .into_iter()
        .map(|position| {
          let [px, py, ..] = position.as_slice() else {
            return Err(ConfigurationError::MalformedGeometry(
              "Arc position needs two values".to_owned(),
            ));
          };
          Ok(match transform {
            Some(t) => {
              x += px;
              y += py;
              WGS84Coordinate::new(
                y * t.scale[1] + t.translate[1],
                x * t.scale[0] + t.translate[0],
              )
            }
            None => WGS84Coordinate::new(*py, *px),
          })
        })
        .collect::<Result<Ring>>()
    })
    .collect()
}
