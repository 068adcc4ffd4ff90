mod boxes;
mod coords;
mod transform;

/// Geographic and world-space bounding boxes.
pub use boxes::*;
/// Coordinates.
pub use coords::*;
/// Transforms.
use transform::TTransform;

/// Maps world coordinates to pixels of the current viewport.
pub type Transform = TTransform<WorldCoordinate, ScreenPosition>;

/// Converts between geographic and world coordinates.
pub trait Projection {
  fn to_world(&self, coord: WGS84Coordinate) -> WorldCoordinate;
  fn to_wgs84(&self, world: WorldCoordinate) -> WGS84Coordinate;
}

/// Spherical Web Mercator onto a square of `WORLD_SIZE` units, as used by web map widgets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WebMercator;

/// Latitudes are clipped so the poles stay finite.
const MAX_SIN_LAT: f64 = 0.9999;

impl Projection for WebMercator {
  fn to_world(&self, coord: WGS84Coordinate) -> WorldCoordinate {
    let sin_lat = coord.lat.to_radians().sin().clamp(-MAX_SIN_LAT, MAX_SIN_LAT);
    WorldCoordinate {
      x: WORLD_SIZE * (0.5 + coord.lon / 360.),
      y: WORLD_SIZE * (0.5 - ((1. + sin_lat) / (1. - sin_lat)).ln() / (4. * PI)),
    }
  }

  fn to_wgs84(&self, world: WorldCoordinate) -> WGS84Coordinate {
    WGS84Coordinate {
      lat: f64::atan(f64::sinh(PI * (1. - 2. * world.y / WORLD_SIZE))).to_degrees(),
      lon: (world.x / WORLD_SIZE - 0.5) * 360.,
    }
  }
}

const PI: f64 = std::f64::consts::PI;

/// The viewport-relative pixel position of `coord`.
///
/// Both the point and the viewport's top-left corner are projected to world coordinates and
/// scaled by `2^zoom`; their difference is the pixel offset from the top-left of the viewport.
pub fn screen_position(
  projection: &dyn Projection,
  zoom: u8,
  bounds: &LatLngBounds,
  coord: WGS84Coordinate,
) -> ScreenPosition {
  viewport_transform(projection, zoom, bounds).apply(projection.to_world(coord))
}

/// The transform from world coordinates to viewport pixels.
pub fn viewport_transform(projection: &dyn Projection, zoom: u8, bounds: &LatLngBounds) -> Transform {
  let scale = zoom_scale(zoom);
  let top_left = projection.to_world(bounds.top_left());
  Transform::default().zoomed(scale).translated(ScreenPosition {
    x: -(top_left.x * scale),
    y: -(top_left.y * scale),
  })
}

/// World units to pixels at `zoom`.
#[must_use]
pub fn zoom_scale(zoom: u8) -> f64 {
  2f64.powi(i32::from(zoom))
}
