use serde::{Deserialize, Serialize};

use super::{Projection, WGS84Coordinate, WorldCoordinate};

/// The geographic extent of the viewport.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct LatLngBounds {
  pub south_west: WGS84Coordinate,
  pub north_east: WGS84Coordinate,
}

impl LatLngBounds {
  #[must_use]
  pub fn new(south_west: WGS84Coordinate, north_east: WGS84Coordinate) -> Self {
    Self {
      south_west,
      north_east,
    }
  }

  /// North-west corner, the pixel origin of the viewport.
  #[must_use]
  pub fn top_left(&self) -> WGS84Coordinate {
    WGS84Coordinate::new(self.north_east.lat, self.south_west.lon)
  }

  #[must_use]
  pub fn contains(&self, coord: WGS84Coordinate) -> bool {
    (self.south_west.lat..=self.north_east.lat).contains(&coord.lat)
      && (self.south_west.lon..=self.north_east.lon).contains(&coord.lon)
  }
}

/// An axis-aligned box in world coordinates.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
  min_x: f64,
  min_y: f64,
  max_x: f64,
  max_y: f64,
}

impl Default for BoundingBox {
  fn default() -> Self {
    Self::new()
  }
}

impl BoundingBox {
  #[must_use]
  pub fn new() -> Self {
    Self::get_invalid()
  }

  #[must_use]
  pub fn get_invalid() -> Self {
    Self {
      max_x: f64::MIN,
      min_x: f64::MAX,
      max_y: f64::MIN,
      min_y: f64::MAX,
    }
  }

  pub fn from_iterator<I: IntoIterator<Item = WGS84Coordinate>>(
    projection: &dyn Projection,
    positions: I,
  ) -> Self {
    let mut bb = Self::get_invalid();
    positions
      .into_iter()
      .for_each(|pos| bb.add_coordinate(projection.to_world(pos)));
    bb
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.min_y <= self.max_y && self.min_x <= self.max_x
  }

  pub fn add_coordinate(&mut self, wc: WorldCoordinate) {
    self.min_y = self.min_y.min(wc.y);
    self.min_x = self.min_x.min(wc.x);
    self.max_y = self.max_y.max(wc.y);
    self.max_x = self.max_x.max(wc.x);
  }

  #[must_use]
  pub fn extend(self, bb: &Self) -> Self {
    if !self.is_valid() {
      return *bb;
    }

    if !bb.is_valid() {
      return self;
    }

    Self {
      min_x: self.min_x.min(bb.min_x),
      min_y: self.min_y.min(bb.min_y),
      max_x: self.max_x.max(bb.max_x),
      max_y: self.max_y.max(bb.max_y),
    }
  }

  #[must_use]
  pub fn contains(&self, wc: WorldCoordinate) -> bool {
    self.is_valid()
      && (self.min_x..=self.max_x).contains(&wc.x)
      && (self.min_y..=self.max_y).contains(&wc.y)
  }

  /// Whether both boxes are valid and overlap, touching edges included.
  #[must_use]
  pub fn intersects(&self, other: &Self) -> bool {
    self.is_valid()
      && other.is_valid()
      && self.min_x <= other.max_x
      && other.min_x <= self.max_x
      && self.min_y <= other.max_y
      && other.min_y <= self.max_y
  }

  #[must_use]
  pub fn center(&self) -> WorldCoordinate {
    WorldCoordinate {
      x: f64::midpoint(self.max_x, self.min_x),
      y: f64::midpoint(self.max_y, self.min_y),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::map::coordinates::WebMercator;

  #[test]
  fn top_left_is_north_west() {
    let bounds = LatLngBounds::new(
      WGS84Coordinate::new(22.1, 113.8),
      WGS84Coordinate::new(22.6, 114.5),
    );
    assert_eq!(bounds.top_left(), WGS84Coordinate::new(22.6, 113.8));
    assert!(bounds.contains(WGS84Coordinate::new(22.3, 114.1)));
    assert!(!bounds.contains(WGS84Coordinate::new(22.7, 114.1)));
  }

  #[test]
  fn bounding_box() {
    let bb = BoundingBox::from_iterator(
      &WebMercator,
      [
        WGS84Coordinate::new(22.2, 114.1),
        WGS84Coordinate::new(22.3, 114.2),
      ],
    );
    assert!(bb.is_valid());
    assert!(bb.contains(WebMercator.to_world(WGS84Coordinate::new(22.25, 114.15))));
    assert!(!bb.contains(WebMercator.to_world(WGS84Coordinate::new(22.35, 114.15))));
    assert!(!BoundingBox::new().contains(bb.center()));
    assert_eq!(BoundingBox::new().extend(&bb), bb);
  }

  #[test]
  fn intersection() {
    let bb = |lat: f64, lon: f64| {
      BoundingBox::from_iterator(
        &WebMercator,
        [
          WGS84Coordinate::new(lat, lon),
          WGS84Coordinate::new(lat + 0.1, lon + 0.1),
        ],
      )
    };
    assert!(bb(22.2, 114.1).intersects(&bb(22.25, 114.15)));
    assert!(!bb(22.2, 114.1).intersects(&bb(22.4, 114.1)));
    assert!(!bb(22.2, 114.1).intersects(&BoundingBox::new()));
  }
}
