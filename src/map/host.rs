use std::fmt;

use super::{
  coordinates::{LatLngBounds, Projection, WGS84Coordinate},
  overlay::Overlay,
};
use crate::district::AreaId;

/// Dense index of an overlay, assigned once when the overlays are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub(crate) usize);

impl OverlayId {
  #[must_use]
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for OverlayId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
  Enter,
  Leave,
}

/// A pointer entering or leaving one feature of a subscribed overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
  pub kind: PointerEventKind,
  /// The overlay the subscription was made for.
  pub overlay: OverlayId,
  pub feature: AreaId,
  /// Where the pointer was when the event fired.
  pub position: WGS84Coordinate,
}

impl PointerEvent {
  #[must_use]
  pub fn enter(overlay: OverlayId, feature: AreaId, position: WGS84Coordinate) -> Self {
    Self {
      kind: PointerEventKind::Enter,
      overlay,
      feature,
      position,
    }
  }

  #[must_use]
  pub fn leave(overlay: OverlayId, feature: AreaId, position: WGS84Coordinate) -> Self {
    Self {
      kind: PointerEventKind::Leave,
      overlay,
      feature,
      position,
    }
  }
}

/// The map widget the overlays are drawn on.
///
/// All calls happen on the UI thread. Attach and detach are only issued when the attachment
/// state of an overlay actually changes.
pub trait MapHost {
  /// The current integer zoom level.
  fn zoom(&self) -> u8;
  /// The geographic extent of the viewport.
  fn bounds(&self) -> LatLngBounds;
  fn projection(&self) -> &dyn Projection;
  fn attach(&mut self, overlay: &Overlay);
  fn detach(&mut self, overlay: &Overlay);
  /// The style override of `feature` changed and needs to be redrawn.
  fn restyle_feature(&mut self, _overlay: &Overlay, _feature: &AreaId) {}
  /// Report pointer enter/leave on the features of `overlay`, tagged with `overlay.id()`.
  fn subscribe_pointer(&mut self, overlay: &Overlay);
}
