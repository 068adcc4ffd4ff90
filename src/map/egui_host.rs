use std::collections::{BTreeSet, HashSet};

use egui::{
  Align2, Color32, Id, Order, PointerButton, Rect, Response, Sense, Stroke, Ui, Vec2,
  epaint::{PathShape, PathStroke},
};

use super::{
  coordinates::{
    BoundingBox, LatLngBounds, Projection, ScreenPosition, Transform, WGS84Coordinate, WebMercator,
    WorldCoordinate, viewport_transform, zoom_scale,
  },
  dcca_map::DccaMap,
  host::{MapHost, OverlayId, PointerEvent},
  overlay::{Overlay, OverlayStore},
};
use crate::district::AreaId;

const MIN_ZOOM: u8 = 8;
const MAX_ZOOM: u8 = 18;
/// Accumulated scroll distance, in points, per zoom level.
const SCROLL_PER_ZOOM: f32 = 50.;

/// A pannable, zoomable egui map that draws attached district overlays and reports the feature
/// under the pointer.
pub struct EguiMapHost {
  center: WorldCoordinate,
  zoom: u8,
  viewport: Vec2,
  projection: WebMercator,
  attached: BTreeSet<OverlayId>,
  subscribed: HashSet<OverlayId>,
  pointer_target: Option<(OverlayId, AreaId)>,
  scroll: f32,
}

impl EguiMapHost {
  #[must_use]
  pub fn new(center: WGS84Coordinate, zoom: u8) -> Self {
    let projection = WebMercator;
    Self {
      center: projection.to_world(center),
      zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
      viewport: Vec2::new(800., 600.),
      projection,
      attached: BTreeSet::new(),
      subscribed: HashSet::new(),
      pointer_target: None,
      scroll: 0.,
    }
  }

  #[must_use]
  pub fn center(&self) -> WGS84Coordinate {
    self.projection.to_wgs84(self.center)
  }

  pub fn set_viewport(&mut self, size: Vec2) {
    self.viewport = size;
  }

  #[must_use]
  pub fn is_attached(&self, overlay: OverlayId) -> bool {
    self.attached.contains(&overlay)
  }

  fn transform(&self) -> Transform {
    viewport_transform(&self.projection, self.zoom, &self.bounds())
  }

  /// Moves the map by `delta` pixels, as when dragging.
  pub fn pan(&mut self, delta: Vec2) {
    let delta = ScreenPosition::from(delta);
    let scale = zoom_scale(self.zoom);
    self.center = self.center - WorldCoordinate::new(delta.x / scale, delta.y / scale);
  }

  /// Changes the zoom by `levels`, keeping the center fixed.
  pub fn zoom_by(&mut self, levels: i8) {
    self.zoom = self
      .zoom
      .saturating_add_signed(levels)
      .clamp(MIN_ZOOM, MAX_ZOOM);
  }

  fn handle_scroll(&mut self, delta: f32) {
    self.scroll += delta;
    while self.scroll >= SCROLL_PER_ZOOM {
      self.scroll -= SCROLL_PER_ZOOM;
      self.zoom_by(1);
    }
    while self.scroll <= -SCROLL_PER_ZOOM {
      self.scroll += SCROLL_PER_ZOOM;
      self.zoom_by(-1);
    }
  }

  /// The topmost feature of an attached, subscribed overlay at `coord`.
  fn hit_test(
    &self,
    overlays: &OverlayStore,
    coord: WGS84Coordinate,
  ) -> Option<(OverlayId, AreaId)> {
    let world = self.projection.to_world(coord);
    self
      .attached
      .iter()
      .rev()
      .filter(|id| self.subscribed.contains(*id))
      .filter_map(|id| overlays.get(*id))
      .filter(|overlay| overlay.bounding_box().contains(world))
      .find_map(|overlay| {
        overlay
          .feature_at(coord)
          .map(|feature| (overlay.id(), feature.id.clone()))
      })
  }

  /// Tracks the pointer at `pointer` (relative to the viewport) and returns the leave and enter
  /// events of the features it moved between.
  pub fn pointer_moved(
    &mut self,
    pointer: Option<ScreenPosition>,
    overlays: &OverlayStore,
  ) -> Vec<PointerEvent> {
    let position = pointer.map(|p| self.projection.to_wgs84(self.transform().invert().apply(p)));
    let target = position.and_then(|coord| self.hit_test(overlays, coord));
    if target == self.pointer_target {
      return Vec::new();
    }

    let position = position.unwrap_or_else(|| self.center());
    let mut events = Vec::new();
    if let Some((overlay, feature)) = self.pointer_target.take() {
      events.push(PointerEvent::leave(overlay, feature, position));
    }
    if let Some((overlay, feature)) = &target {
      events.push(PointerEvent::enter(*overlay, feature.clone(), position));
    }
    self.pointer_target = target;
    events
  }

  /// Draws the attached overlays in view into `rect`.
  pub fn paint(&self, ui: &Ui, rect: Rect, overlays: &OverlayStore) {
    let bounds = self.bounds();
    let viewport =
      BoundingBox::from_iterator(&self.projection, [bounds.south_west, bounds.north_east]);
    let transform = self.transform();
    let to_screen = |coord: &WGS84Coordinate| {
      rect.min + Vec2::from(transform.apply(self.projection.to_world(*coord)))
    };
    let painter = ui.painter_at(rect);
    for overlay in self
      .attached
      .iter()
      .filter_map(|id| overlays.get(*id))
      .filter(|overlay| overlay.bounding_box().intersects(&viewport))
    {
      for feature in overlay.features() {
        let style = overlay.feature_style(&feature.id);
        let stroke = PathStroke::new(style.stroke_weight, style.fill_color);
        for rings in feature.geometry.polygons() {
          for (i, ring) in rings.iter().enumerate() {
            painter.add(PathShape {
              points: ring.iter().map(to_screen).collect(),
              closed: true,
              fill: if i == 0 {
                style.translucent_fill()
              } else {
                Color32::TRANSPARENT
              },
              stroke: stroke.clone(),
            });
          }
        }
      }
    }
  }

  /// Pans and zooms from the input of `response`.
  fn handle_input(&mut self, ui: &Ui, response: &Response) {
    if response.dragged_by(PointerButton::Primary) {
      self.pan(response.drag_delta());
    }
    if response.hovered() {
      let delta = ui.input(|i| i.smooth_scroll_delta.y);
      if delta != 0. {
        self.handle_scroll(delta);
      }
    }
  }
}

impl MapHost for EguiMapHost {
  fn zoom(&self) -> u8 {
    self.zoom
  }

  fn bounds(&self) -> LatLngBounds {
    let scale = zoom_scale(self.zoom);
    let half = ScreenPosition::from(self.viewport * 0.5);
    let half = WorldCoordinate::new(half.x / scale, half.y / scale);
    let top_left = self.projection.to_wgs84(self.center - half);
    let bottom_right = self.projection.to_wgs84(self.center + half);
    LatLngBounds::new(
      WGS84Coordinate::new(bottom_right.lat, top_left.lon),
      WGS84Coordinate::new(top_left.lat, bottom_right.lon),
    )
  }

  fn projection(&self) -> &dyn Projection {
    &self.projection
  }

  fn attach(&mut self, overlay: &Overlay) {
    self.attached.insert(overlay.id());
  }

  fn detach(&mut self, overlay: &Overlay) {
    self.attached.remove(&overlay.id());
    if self
      .pointer_target
      .as_ref()
      .is_some_and(|(id, _)| *id == overlay.id())
    {
      self.pointer_target = None;
    }
  }

  fn subscribe_pointer(&mut self, overlay: &Overlay) {
    self.subscribed.insert(overlay.id());
  }
}

impl DccaMap<EguiMapHost> {
  /// Shows the map in the remaining space of `ui`, with the tooltip of the hovered area.
  pub fn show(&mut self, ui: &mut Ui) -> Response {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

    let (host, overlays) = self.host_and_overlays();
    host.set_viewport(rect.size());
    host.handle_input(ui, &response);
    let pointer = response
      .hover_pos()
      .map(|pos| ScreenPosition::from(pos - rect.min));
    let events = host.pointer_moved(pointer, overlays);
    for event in &events {
      self.handle_pointer(event);
    }

    if ui.is_rect_visible(rect) {
      let (host, overlays) = self.host_and_overlays();
      host.paint(ui, rect, overlays);
    }

    let tooltip = self.tooltip();
    if tooltip.is_visible() {
      egui::Area::new(Id::new("dcca_tooltip"))
        .order(Order::Tooltip)
        .fixed_pos(rect.min + Vec2::from(tooltip.anchor))
        .pivot(Align2::LEFT_BOTTOM)
        .interactable(false)
        .show(ui.ctx(), |ui| {
          egui::Frame::popup(ui.style())
            .stroke(Stroke::new(1., Color32::DARK_GRAY))
            .show(ui, |ui| ui.label(&tooltip.text));
        });
    }
    response
  }
}

#[cfg(test)]
mod tests {
  use assert_approx_eq::assert_approx_eq;

  use super::*;
  use crate::map::{host::PointerEventKind, overlay::test_utils::load};

  fn host() -> EguiMapHost {
    EguiMapHost::new(WGS84Coordinate::new(22.22, 114.105), 11)
  }

  /// The viewport position of `coord`.
  fn screen(host: &EguiMapHost, coord: WGS84Coordinate) -> ScreenPosition {
    host.transform().apply(host.projection.to_world(coord))
  }

  #[test]
  fn bounds_are_centered() {
    let host = host();
    let bounds = host.bounds();
    assert!(bounds.contains(WGS84Coordinate::new(22.22, 114.105)));
    assert!(bounds.south_west.lat < bounds.north_east.lat);
    assert!(bounds.south_west.lon < bounds.north_east.lon);

    let center = screen(&host, host.center());
    assert_approx_eq!(center.x, 400., 1e-6);
    assert_approx_eq!(center.y, 300., 1e-6);
  }

  #[test]
  fn pan_moves_the_center_by_pixels() {
    let mut host = host();
    let before = host.center();
    host.pan(Vec2::new(100., 0.));
    assert!(host.center().lon < before.lon);
    assert_approx_eq!(host.center().lat, before.lat, 1e-9);
  }

  #[test]
  fn scrolling_steps_and_clamps_zoom() {
    let mut host = host();
    host.handle_scroll(30.);
    assert_eq!(host.zoom(), 11);
    host.handle_scroll(30.);
    assert_eq!(host.zoom(), 12);
    host.handle_scroll(-1000.);
    assert_eq!(host.zoom(), MIN_ZOOM);
    host.zoom_by(100);
    assert_eq!(host.zoom(), MAX_ZOOM);
  }

  #[test]
  fn pointer_reports_enter_and_leave() {
    let mut host = host();
    let mut store = load(&["A", "B"], &mut host);
    for overlay in store.iter_mut() {
      host.attach(overlay);
      overlay.set_attached(true);
    }
    let a = store.by_code("A").unwrap().id();

    let inside_a = screen(&host, WGS84Coordinate::new(22.205, 114.105));
    let events = host.pointer_moved(Some(inside_a), &store);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, PointerEventKind::Enter);
    assert_eq!(events[0].overlay, a);
    assert_eq!(events[0].feature.as_str(), "A01");

    assert!(host.pointer_moved(Some(inside_a), &store).is_empty());

    let inside_b = screen(&host, WGS84Coordinate::new(22.225, 114.105));
    let events = host.pointer_moved(Some(inside_b), &store);
    let kinds: Vec<_> = events.iter().map(|e| (e.kind, e.feature.as_str())).collect();
    assert_eq!(
      kinds,
      [(PointerEventKind::Leave, "A01"), (PointerEventKind::Enter, "B01")]
    );

    let events = host.pointer_moved(None, &store);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, PointerEventKind::Leave);
  }

  #[test]
  fn detached_overlays_are_not_hit() {
    let mut host = host();
    let store = load(&["A"], &mut host);
    let inside_a = screen(&host, WGS84Coordinate::new(22.205, 114.105));
    assert!(host.pointer_moved(Some(inside_a), &store).is_empty());

    let overlay = store.by_code("A").unwrap();
    host.attach(overlay);
    assert_eq!(host.pointer_moved(Some(inside_a), &store).len(), 1);
    host.detach(overlay);
    assert!(!host.is_attached(overlay.id()));
    assert!(host.pointer_moved(Some(inside_a), &store).is_empty());
  }
}
