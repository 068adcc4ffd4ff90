use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Edge length of the world square the projection maps onto.
pub const WORLD_SIZE: f64 = 256.;

pub trait XY:
  Default + Copy + Clone + AddAssign<Self> + Mul<f64, Output = Self> + Add<Self, Output = Self>
{
  fn x(&self) -> f64;
  fn y(&self) -> f64;
  #[must_use]
  fn with_x(self, x: f64) -> Self;
  #[must_use]
  fn with_y(self, y: f64) -> Self;
}

/// The standard WGS84 coordinate system.
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct WGS84Coordinate {
  #[serde(alias = "latitude")]
  pub lat: f64,
  #[serde(alias = "longitude", alias = "lng")]
  pub lon: f64,
}

impl WGS84Coordinate {
  #[must_use]
  pub fn new(lat: f64, lon: f64) -> Self {
    Self { lat, lon }
  }

  #[must_use]
  pub fn is_valid(&self) -> bool {
    -90.0 <= self.lat && self.lat <= 90.0 && -180.0 <= self.lon && self.lon <= 180.0
  }
}

/// A position on the projected world square, independent of zoom.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct WorldCoordinate {
  pub x: f64,
  pub y: f64,
}

impl WorldCoordinate {
  #[must_use]
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// A pixel offset from the top-left corner of the map viewport.
#[derive(Debug, Default, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct ScreenPosition {
  pub x: f64,
  pub y: f64,
}

impl ScreenPosition {
  #[must_use]
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

#[allow(clippy::cast_possible_truncation)]
impl From<ScreenPosition> for egui::Vec2 {
  fn from(pos: ScreenPosition) -> Self {
    egui::vec2(pos.x as f32, pos.y as f32)
  }
}

impl From<egui::Vec2> for ScreenPosition {
  fn from(v: egui::Vec2) -> Self {
    ScreenPosition {
      x: f64::from(v.x),
      y: f64::from(v.y),
    }
  }
}

macro_rules! impl_xy {
  ($t:ty) => {
    impl XY for $t {
      fn x(&self) -> f64 {
        self.x
      }

      fn y(&self) -> f64 {
        self.y
      }

      fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
      }

      fn with_y(mut self, y: f64) -> Self {
        self.y = y;
        self
      }
    }

    impl Add for $t {
      type Output = Self;

      fn add(self, rhs: Self) -> Self {
        Self {
          x: self.x + rhs.x,
          y: self.y + rhs.y,
        }
      }
    }

    impl Sub for $t {
      type Output = Self;

      fn sub(self, rhs: Self) -> Self {
        Self {
          x: self.x - rhs.x,
          y: self.y - rhs.y,
        }
      }
    }

    impl AddAssign for $t {
      fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
      }
    }

    impl Mul<f64> for $t {
      type Output = Self;

      fn mul(self, rhs: f64) -> Self {
        Self {
          x: self.x * rhs,
          y: self.y * rhs,
        }
      }
    }
  };
}

impl_xy!(WorldCoordinate);
impl_xy!(ScreenPosition);
