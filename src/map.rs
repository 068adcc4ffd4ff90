/// Contains everything needed to handle coordinates.
pub mod coordinates;
/// The overlays, the district filter and the hover tooltip together.
pub mod dcca_map;
/// The map widget.
pub mod egui_host;
/// Handles geometry.
pub mod geometry;
/// The interface to the map the overlays are drawn on.
pub mod host;
pub mod hover;
pub mod overlay;
/// Keeps attached overlays in line with the district filter.
pub mod reconcile;
pub mod style;
