use egui::Color32;
use serde::{Deserialize, Serialize};

/// Stroke weight of every district boundary, in pixels.
pub const STROKE_WEIGHT: f32 = 1.25;
/// Fill opacity of every district overlay.
pub const FILL_OPACITY: f32 = 0.5;

/// How a district overlay is drawn.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Style {
  pub fill_color: Color32,
  pub fill_opacity: f32,
  pub stroke_weight: f32,
}

impl Style {
  /// The base style of a district with the given fill color.
  #[must_use]
  pub fn district(fill_color: Color32) -> Self {
    Self {
      fill_color,
      fill_opacity: FILL_OPACITY,
      stroke_weight: STROKE_WEIGHT,
    }
  }

  #[must_use]
  pub fn with_fill_color(mut self, fill_color: Color32) -> Self {
    self.fill_color = fill_color;
    self
  }

  /// Applies the fields set in `style` on top of this one.
  #[must_use]
  pub fn overwrite_with(&self, style: &StyleOverride) -> Style {
    Style {
      fill_color: style.fill_color.unwrap_or(self.fill_color),
      fill_opacity: style.fill_opacity.unwrap_or(self.fill_opacity),
      stroke_weight: style.stroke_weight.unwrap_or(self.stroke_weight),
    }
  }

  #[must_use]
  pub fn optional_overwrite_with(&self, style: Option<&StyleOverride>) -> Style {
    style.map_or(*self, |s| self.overwrite_with(s))
  }

  /// The fill color with the fill opacity applied.
  #[must_use]
  pub fn translucent_fill(&self) -> Color32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let alpha = (self.fill_opacity.clamp(0., 1.) * 255.).round() as u8;
    let [r, g, b, _] = self.fill_color.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
  }
}

/// A partial style applied to a single feature on top of its overlay's style.
#[derive(Clone, Copy, Default, PartialEq, Debug, Serialize, Deserialize)]
pub struct StyleOverride {
  pub fill_color: Option<Color32>,
  pub fill_opacity: Option<f32>,
  pub stroke_weight: Option<f32>,
}

impl StyleOverride {
  #[must_use]
  pub fn with_fill_color(mut self, fill_color: Color32) -> Self {
    self.fill_color = Some(fill_color);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn district_style() {
    let style = Style::district(Color32::from_rgb(0x54, 0x41, 0x71));
    assert_eq!(style.stroke_weight, 1.25);
    assert_eq!(style.fill_opacity, 0.5);
    assert_eq!(style.translucent_fill(), Color32::from_rgba_unmultiplied(0x54, 0x41, 0x71, 128));
  }

  #[test]
  fn override_only_touches_set_fields() {
    let style = Style::district(Color32::RED);
    let merged = style.overwrite_with(&StyleOverride::default().with_fill_color(Color32::BLUE));
    assert_eq!(merged, style.with_fill_color(Color32::BLUE));
    assert_eq!(style.optional_overwrite_with(None), style);
  }
}
