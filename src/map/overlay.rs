use std::collections::HashMap;

use super::{
  coordinates::{BoundingBox, Projection, WGS84Coordinate},
  geometry::Feature,
  host::{MapHost, OverlayId},
  style::{Style, StyleOverride},
};
use crate::{
  color::ColorAssigner,
  district::{AreaId, DistrictCode},
  error::{ConfigurationError, Result},
  parser::GeometrySource,
};

/// The boundary features of one district, drawn with one style.
#[derive(Debug, Clone)]
pub struct Overlay {
  id: OverlayId,
  code: DistrictCode,
  style: Style,
  features: Vec<Feature>,
  overrides: HashMap<AreaId, StyleOverride>,
  bounding_box: BoundingBox,
  attached: bool,
}

impl Overlay {
  #[must_use]
  pub fn new(
    id: OverlayId,
    code: DistrictCode,
    style: Style,
    features: Vec<Feature>,
    projection: &dyn Projection,
  ) -> Self {
    let bounding_box = features.iter().fold(BoundingBox::new(), |bb, feature| {
      bb.extend(&feature.geometry.bounding_box(projection))
    });
    Self {
      id,
      code,
      style,
      features,
      overrides: HashMap::new(),
      bounding_box,
      attached: false,
    }
  }

  /// World-space extent of all features. Invalid for an overlay without polygons.
  #[must_use]
  pub fn bounding_box(&self) -> &BoundingBox {
    &self.bounding_box
  }

  #[must_use]
  pub fn id(&self) -> OverlayId {
    self.id
  }

  #[must_use]
  pub fn code(&self) -> &DistrictCode {
    &self.code
  }

  /// The base style, never changed by hovering.
  #[must_use]
  pub fn style(&self) -> &Style {
    &self.style
  }

  #[must_use]
  pub fn features(&self) -> &[Feature] {
    &self.features
  }

  #[must_use]
  pub fn feature(&self, id: &AreaId) -> Option<&Feature> {
    self.features.iter().find(|f| &f.id == id)
  }

  /// The topmost feature containing `point`.
  #[must_use]
  pub fn feature_at(&self, point: WGS84Coordinate) -> Option<&Feature> {
    self.features.iter().rev().find(|f| f.geometry.contains(point))
  }

  #[must_use]
  pub fn is_attached(&self) -> bool {
    self.attached
  }

  pub(crate) fn set_attached(&mut self, attached: bool) {
    self.attached = attached;
  }

  /// The style `feature` is drawn with, including a transient override.
  #[must_use]
  pub fn feature_style(&self, feature: &AreaId) -> Style {
    self.style.optional_overwrite_with(self.overrides.get(feature))
  }

  #[must_use]
  pub fn has_override(&self, feature: &AreaId) -> bool {
    self.overrides.contains_key(feature)
  }

  /// Overrides the style of one feature. Returns false for unknown features.
  pub fn override_style(&mut self, feature: &AreaId, style: StyleOverride) -> bool {
    if self.feature(feature).is_none() {
      return false;
    }
    self.overrides.insert(feature.clone(), style);
    true
  }

  /// Drops the override of `feature`. Returns whether there was one.
  pub fn revert_style(&mut self, feature: &AreaId) -> bool {
    self.overrides.remove(feature).is_some()
  }
}

/// All district overlays, indexed by [`OverlayId`] and by district code.
#[derive(Debug, Default)]
pub struct OverlayStore {
  overlays: Vec<Overlay>,
  by_code: HashMap<DistrictCode, OverlayId>,
}

impl OverlayStore {
  /// Builds one detached overlay per district and subscribes each to pointer events.
  ///
  /// Fails if any district has no entry in `source`; a missing overlay would look exactly like a
  /// district hidden by the filter.
  pub fn load(
    source: &dyn GeometrySource,
    codes: &[DistrictCode],
    colors: &ColorAssigner,
    host: &mut dyn MapHost,
  ) -> Result<Self> {
    let mut store = Self::default();
    for code in codes {
      if store.by_code.contains_key(code) {
        log::warn!("District {code} listed twice, ignoring the duplicate");
        continue;
      }
      let features = source
        .district_features(code)?
        .ok_or_else(|| ConfigurationError::MissingGeometry(code.to_string()))?;
      if features.iter().all(|f| f.geometry.is_empty()) {
        log::warn!("District {code} has no boundary polygons");
      }

      let id = OverlayId(store.overlays.len());
      let overlay = Overlay::new(
        id,
        code.clone(),
        Style::district(colors.color_for(code)),
        features,
        host.projection(),
      );
      host.subscribe_pointer(&overlay);
      log::debug!(
        "Loaded overlay {id} for district {code} with {} features",
        overlay.features.len()
      );
      store.by_code.insert(code.clone(), id);
      store.overlays.push(overlay);
    }
    Ok(store)
  }

  #[must_use]
  pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
    self.overlays.get(id.0)
  }

  pub fn get_mut(&mut self, id: OverlayId) -> Option<&mut Overlay> {
    self.overlays.get_mut(id.0)
  }

  #[must_use]
  pub fn by_code(&self, code: &str) -> Option<&Overlay> {
    self.by_code.get(code).and_then(|id| self.get(*id))
  }

  /// Overlays in load order.
  pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
    self.overlays.iter()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Overlay> {
    self.overlays.iter_mut()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.overlays.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.overlays.is_empty()
  }
}

#[cfg(test)]
pub(crate) mod test_utils {
  use std::collections::{HashMap, HashSet};

  use super::*;
  use crate::map::{
    coordinates::{LatLngBounds, Projection, WebMercator},
    geometry::Geometry,
  };

  /// A host that records every call.
  pub struct RecordingHost {
    pub zoom: u8,
    pub bounds: LatLngBounds,
    pub attached: HashSet<OverlayId>,
    pub attach_calls: usize,
    pub detach_calls: usize,
    pub restyled: Vec<(OverlayId, AreaId)>,
    pub subscribed: Vec<OverlayId>,
  }

  impl Default for RecordingHost {
    fn default() -> Self {
      Self {
        zoom: 11,
        bounds: LatLngBounds::new(
          WGS84Coordinate::new(22.15, 113.83),
          WGS84Coordinate::new(22.56, 114.43),
        ),
        attached: HashSet::new(),
        attach_calls: 0,
        detach_calls: 0,
        restyled: Vec::new(),
        subscribed: Vec::new(),
      }
    }
  }

  impl MapHost for RecordingHost {
    fn zoom(&self) -> u8 {
      self.zoom
    }

    fn bounds(&self) -> LatLngBounds {
      self.bounds
    }

    fn projection(&self) -> &dyn Projection {
      &WebMercator
    }

    fn attach(&mut self, overlay: &Overlay) {
      self.attach_calls += 1;
      assert!(self.attached.insert(overlay.id()), "attached twice");
    }

    fn detach(&mut self, overlay: &Overlay) {
      self.detach_calls += 1;
      assert!(self.attached.remove(&overlay.id()), "detached while detached");
    }

    fn restyle_feature(&mut self, overlay: &Overlay, feature: &AreaId) {
      self.restyled.push((overlay.id(), feature.clone()));
    }

    fn subscribe_pointer(&mut self, overlay: &Overlay) {
      self.subscribed.push(overlay.id());
    }
  }

  /// A source with one square feature `<code>01` per district, stacked by letter.
  pub struct SquareSource(pub HashMap<String, Vec<Feature>>);

  impl SquareSource {
    pub fn new(codes: &[&str]) -> Self {
      Self(
        codes
          .iter()
          .enumerate()
          .map(|(i, code)| {
            #[allow(clippy::cast_precision_loss)]
            let lat = 22.2 + 0.02 * i as f64;
            (
              (*code).to_owned(),
              vec![Feature::new(AreaId::new(format!("{code}01")), square(lat, 114.1, 0.01))],
            )
          })
          .collect(),
      )
    }
  }

  pub fn square(lat: f64, lon: f64, size: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
      WGS84Coordinate::new(lat, lon),
      WGS84Coordinate::new(lat, lon + size),
      WGS84Coordinate::new(lat + size, lon + size),
      WGS84Coordinate::new(lat + size, lon),
      WGS84Coordinate::new(lat, lon),
    ]])
  }

  impl GeometrySource for SquareSource {
    fn district_features(&self, code: &DistrictCode) -> Result<Option<Vec<Feature>>> {
      Ok(self.0.get(code.as_str()).cloned())
    }
  }

  pub fn codes(codes: &[&str]) -> Vec<DistrictCode> {
    codes.iter().map(|c| DistrictCode::new(*c).unwrap()).collect()
  }

  pub fn load(names: &[&str], host: &mut dyn MapHost) -> OverlayStore {
    let codes = codes(names);
    let colors = ColorAssigner::with_default_palette(&codes).unwrap();
    OverlayStore::load(&SquareSource::new(names), &codes, &colors, host).unwrap()
  }

  /// Loads and attaches every district.
  pub fn load_attached(names: &[&str], host: &mut dyn MapHost) -> OverlayStore {
    let mut store = load(names, host);
    let visible = codes(names).into_iter().collect();
    crate::map::reconcile::apply(&mut store, &visible, host);
    store
  }
}

#[cfg(test)]
mod tests {
  use super::{test_utils::*, *};
  use crate::{color::ColorAssigner, map::coordinates::WebMercator};

  #[test]
  fn overlays_start_detached_and_subscribed() {
    let mut host = RecordingHost::default();
    let store = load(&["A", "B", "D"], &mut host);

    assert_eq!(store.len(), 3);
    assert!(store.iter().all(|o| !o.is_attached()));
    assert_eq!(host.attach_calls, 0);
    assert_eq!(
      host.subscribed,
      store.iter().map(Overlay::id).collect::<Vec<_>>()
    );
  }

  #[test]
  fn overlays_are_colored_by_code() {
    let mut host = RecordingHost::default();
    let store = load(&["A", "B", "D"], &mut host);
    let colors = ColorAssigner::with_default_palette(&codes(&["A", "B", "D"])).unwrap();
    let palette = colors.palette();

    assert_eq!(store.by_code("A").unwrap().style().fill_color, palette[0]);
    assert_eq!(store.by_code("D").unwrap().style().fill_color, palette[3]);
    assert_eq!(store.by_code("D").unwrap().style().stroke_weight, 1.25);
    assert!(store.by_code("C").is_none());
  }

  #[test]
  fn ids_index_the_store() {
    let mut host = RecordingHost::default();
    let store = load(&["A", "B", "D"], &mut host);
    for overlay in store.iter() {
      assert_eq!(store.get(overlay.id()).unwrap().code(), overlay.code());
    }
  }

  #[test]
  fn missing_geometry_fails() {
    let mut host = RecordingHost::default();
    let codes = codes(&["A", "B"]);
    let colors = ColorAssigner::with_default_palette(&codes).unwrap();
    let err = OverlayStore::load(&SquareSource::new(&["A"]), &codes, &colors, &mut host).unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingGeometry(code) if code == "B"));
  }

  #[test]
  fn override_and_revert_restore_style() {
    let mut host = RecordingHost::default();
    let mut store = load(&["A"], &mut host);
    let overlay = store.iter_mut().next().unwrap();
    let feature = AreaId::from("A01");
    let before = overlay.feature_style(&feature);

    assert!(overlay.override_style(
      &feature,
      StyleOverride::default().with_fill_color(egui::Color32::WHITE)
    ));
    assert_eq!(overlay.feature_style(&feature).fill_color, egui::Color32::WHITE);
    assert_eq!(*overlay.style(), before);

    assert!(overlay.revert_style(&feature));
    assert!(!overlay.revert_style(&feature));
    assert_eq!(overlay.feature_style(&feature), before);
    assert!(!overlay.override_style(&AreaId::from("Z99"), StyleOverride::default()));
  }

  #[test]
  fn feature_at_hit_tests() {
    let mut host = RecordingHost::default();
    let store = load(&["A"], &mut host);
    let overlay = store.by_code("A").unwrap();
    assert_eq!(
      overlay.feature_at(WGS84Coordinate::new(22.205, 114.105)).map(|f| f.id.as_str()),
      Some("A01")
    );
    assert!(overlay.feature_at(WGS84Coordinate::new(22.5, 114.105)).is_none());
  }

  #[test]
  fn bounding_box_covers_features() {
    let mut host = RecordingHost::default();
    let store = load(&["A", "B"], &mut host);
    let a = store.by_code("A").unwrap().bounding_box();
    let b = store.by_code("B").unwrap().bounding_box();
    assert!(a.contains(WebMercator.to_world(WGS84Coordinate::new(22.205, 114.105))));
    assert!(!a.intersects(b));
  }
}
