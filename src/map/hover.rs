use super::{
  coordinates::{ScreenPosition, screen_position},
  host::{MapHost, OverlayId, PointerEvent, PointerEventKind},
  overlay::OverlayStore,
  style::StyleOverride,
};
use crate::{
  color::{HIGHLIGHT_BRIGHTEN, brighten},
  district::{AreaId, NameTable},
};

/// Called with the hovered area on enter and with `None` on leave.
pub type ActiveAreaObserver = Box<dyn FnMut(Option<&AreaId>)>;

/// The name tooltip next to the pointer. Hidden while the text is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
  pub text: String,
  pub anchor: ScreenPosition,
}

impl Tooltip {
  #[must_use]
  pub fn is_visible(&self) -> bool {
    !self.text.is_empty()
  }
}

/// The feature the pointer is currently over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
  pub overlay: OverlayId,
  pub feature: AreaId,
}

/// Highlights the hovered feature and publishes its name tooltip.
///
/// Holds at most one [`HoverTarget`]; entering a new feature first leaves the old one.
pub struct HoverHandler {
  hovered: Option<HoverTarget>,
  tooltip: Tooltip,
  observer: ActiveAreaObserver,
  brighten_percent: u8,
}

impl Default for HoverHandler {
  fn default() -> Self {
    Self::new()
  }
}

impl HoverHandler {
  #[must_use]
  pub fn new() -> Self {
    Self {
      hovered: None,
      tooltip: Tooltip::default(),
      observer: Box::new(|_| {}),
      brighten_percent: HIGHLIGHT_BRIGHTEN,
    }
  }

  pub fn set_observer(&mut self, observer: impl FnMut(Option<&AreaId>) + 'static) {
    self.observer = Box::new(observer);
  }

  pub fn clear_observer(&mut self) {
    self.observer = Box::new(|_| {});
  }

  #[must_use]
  pub fn hovered(&self) -> Option<&HoverTarget> {
    self.hovered.as_ref()
  }

  #[must_use]
  pub fn tooltip(&self) -> &Tooltip {
    &self.tooltip
  }

  pub fn handle(
    &mut self,
    event: &PointerEvent,
    store: &mut OverlayStore,
    names: &NameTable,
    host: &mut dyn MapHost,
  ) {
    match event.kind {
      PointerEventKind::Enter => self.enter(event, store, names, host),
      PointerEventKind::Leave => self.leave(event, store, host),
    }
  }

  fn enter(
    &mut self,
    event: &PointerEvent,
    store: &mut OverlayStore,
    names: &NameTable,
    host: &mut dyn MapHost,
  ) {
    let target = HoverTarget {
      overlay: event.overlay,
      feature: event.feature.clone(),
    };
    if self.hovered.as_ref() == Some(&target) {
      return;
    }
    if self.hovered.is_some() {
      self.end_hover(store, host);
    }

    let Some(overlay) = store.get_mut(event.overlay) else {
      log::warn!("Pointer entered unknown overlay {}", event.overlay);
      return;
    };
    if !overlay.is_attached() {
      log::debug!(
        "Ignoring pointer on hidden district {} at {}",
        overlay.code(),
        event.feature
      );
      return;
    }
    let highlight = brighten(overlay.style().fill_color, self.brighten_percent);
    if !overlay.override_style(
      &event.feature,
      StyleOverride::default().with_fill_color(highlight),
    ) {
      log::warn!(
        "Pointer entered unknown feature {} of district {}",
        event.feature,
        overlay.code()
      );
      return;
    }
    host.restyle_feature(overlay, &event.feature);

    let anchor = screen_position(host.projection(), host.zoom(), &host.bounds(), event.position);
    self.tooltip = Tooltip {
      text: names.label(event.feature.as_str()),
      anchor,
    };
    log::trace!("Hovering {} at {anchor:?}", event.feature);
    self.hovered = Some(target);
    (self.observer)(Some(&event.feature));
  }

  fn leave(&mut self, event: &PointerEvent, store: &mut OverlayStore, host: &mut dyn MapHost) {
    let is_current = self
      .hovered
      .as_ref()
      .is_some_and(|t| t.overlay == event.overlay && t.feature == event.feature);
    if is_current {
      self.end_hover(store, host);
    }
  }

  /// Reverts the highlight, hides the tooltip and reports that no area is active.
  /// Does nothing while idle.
  pub fn end_hover(&mut self, store: &mut OverlayStore, host: &mut dyn MapHost) {
    let Some(target) = self.hovered.take() else {
      return;
    };
    if let Some(overlay) = store.get_mut(target.overlay)
      && overlay.revert_style(&target.feature)
    {
      host.restyle_feature(overlay, &target.feature);
    }
    self.tooltip = Tooltip::default();
    (self.observer)(None);
  }
}
