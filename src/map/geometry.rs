use itertools::Either;
use serde::{Deserialize, Serialize};

use super::coordinates::{BoundingBox, Projection, WGS84Coordinate};
use crate::district::AreaId;

/// A closed ring of geographic coordinates.
pub type Ring = Vec<WGS84Coordinate>;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum Geometry {
  /// Exterior ring followed by holes.
  Polygon(Vec<Ring>),
  GeometryCollection(Vec<Geometry>),
}

impl Geometry {
  /// Every polygon, with nested collections flattened.
  pub fn polygons(&self) -> impl Iterator<Item = &[Ring]> + '_ {
    match self {
      Geometry::Polygon(rings) => Either::Left(std::iter::once(rings.as_slice())),
      Geometry::GeometryCollection(geometries) => Either::Right(
        geometries
          .iter()
          .flat_map(|g| g.polygons().collect::<Vec<_>>()),
      ),
    }
  }

  /// Even-odd containment, so holes are excluded.
  #[must_use]
  pub fn contains(&self, point: WGS84Coordinate) -> bool {
    self
      .polygons()
      .any(|rings| rings.iter().filter(|ring| ring_crosses(ring, point)).count() % 2 == 1)
  }

  pub fn bounding_box(&self, projection: &dyn Projection) -> BoundingBox {
    BoundingBox::from_iterator(
      projection,
      self
        .polygons()
        .filter_map(<[Ring]>::first)
        .flatten()
        .copied(),
    )
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.polygons().next().is_none()
  }
}

/// Whether a ray from `point` towards east crosses `ring` an odd number of times.
fn ring_crosses(ring: &[WGS84Coordinate], point: WGS84Coordinate) -> bool {
  let mut inside = false;
  let Some(mut prev) = ring.last() else {
    return false;
  };
  for curr in ring {
    if (curr.lat > point.lat) != (prev.lat > point.lat) {
      let lon_at = (prev.lon - curr.lon) * (point.lat - curr.lat) / (prev.lat - curr.lat) + curr.lon;
      if point.lon < lon_at {
        inside = !inside;
      }
    }
    prev = curr;
  }
  inside
}

/// One DCCA area of a district overlay.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Feature {
  pub id: AreaId,
  pub geometry: Geometry,
}

impl Feature {
  #[must_use]
  pub fn new(id: AreaId, geometry: Geometry) -> Self {
    Self { id, geometry }
  }
}
