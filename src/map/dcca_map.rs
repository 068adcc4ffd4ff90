use std::collections::HashSet;

use egui::Color32;

use super::{
  host::{MapHost, PointerEvent},
  hover::{HoverHandler, HoverTarget, Tooltip},
  overlay::OverlayStore,
  reconcile::{self, Reconciliation},
};
use crate::{
  color::ColorAssigner,
  district::{AreaId, DistrictCode, Districts, NameTable},
  error::Result,
  parser::GeometrySource,
};

/// The DCCA boundary map: district overlays on a host map, a district filter and a hover tooltip.
pub struct DccaMap<H: MapHost> {
  host: H,
  districts: Districts,
  area_names: NameTable,
  overlays: OverlayStore,
  hover: HoverHandler,
  visible: HashSet<DistrictCode>,
}

impl<H: MapHost> DccaMap<H> {
  /// Loads every district overlay and shows all of them.
  ///
  /// Fails on an unusable palette or a district without geometry. Nothing after this can fail.
  pub fn mount(
    mut host: H,
    source: &dyn GeometrySource,
    districts: Districts,
    area_names: NameTable,
    palette: Vec<Color32>,
  ) -> Result<Self> {
    let colors = ColorAssigner::new(palette, districts.codes())?;
    let overlays = OverlayStore::load(source, districts.codes(), &colors, &mut host)?;
    log::info!("Loaded {} district overlays", overlays.len());

    let mut map = Self {
      host,
      visible: districts.codes().iter().cloned().collect(),
      districts,
      area_names,
      overlays,
      hover: HoverHandler::new(),
    };
    map.reconcile();
    Ok(map)
  }

  /// Replaces the visible districts with `codes`.
  pub fn set_visible_districts(&mut self, codes: impl IntoIterator<Item = DistrictCode>) {
    self.visible = codes.into_iter().collect();
    for code in &self.visible {
      if self.overlays.by_code(code.as_str()).is_none() {
        log::debug!("Ignoring unknown district {code} in filter");
      }
    }
    self.reconcile();
  }

  fn reconcile(&mut self) -> Reconciliation {
    let result = reconcile::apply(&mut self.overlays, &self.visible, &mut self.host);
    let hovered_detached = self
      .hover
      .hovered()
      .and_then(|target| self.overlays.get(target.overlay))
      .is_some_and(|overlay| !overlay.is_attached());
    if hovered_detached {
      self.hover.end_hover(&mut self.overlays, &mut self.host);
    }
    result
  }

  pub fn handle_pointer(&mut self, event: &PointerEvent) {
    self
      .hover
      .handle(event, &mut self.overlays, &self.area_names, &mut self.host);
  }

  /// Registers the callback notified whenever the hovered area changes.
  pub fn set_active_area_observer(&mut self, observer: impl FnMut(Option<&AreaId>) + 'static) {
    self.hover.set_observer(observer);
  }

  #[must_use]
  pub fn tooltip(&self) -> &Tooltip {
    self.hover.tooltip()
  }

  #[must_use]
  pub fn hovered(&self) -> Option<&HoverTarget> {
    self.hover.hovered()
  }

  #[must_use]
  pub fn visible_districts(&self) -> &HashSet<DistrictCode> {
    &self.visible
  }

  #[must_use]
  pub fn is_visible(&self, code: &DistrictCode) -> bool {
    self.visible.contains(code)
  }

  #[must_use]
  pub fn districts(&self) -> &Districts {
    &self.districts
  }

  #[must_use]
  pub fn overlays(&self) -> &OverlayStore {
    &self.overlays
  }

  #[must_use]
  pub fn host(&self) -> &H {
    &self.host
  }

  pub fn host_mut(&mut self) -> &mut H {
    &mut self.host
  }

  /// The host for drawing alongside the overlays it draws.
  pub fn host_and_overlays(&mut self) -> (&mut H, &OverlayStore) {
    (&mut self.host, &self.overlays)
  }
}
