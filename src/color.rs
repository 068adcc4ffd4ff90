use egui::Color32;

use crate::{
  district::DistrictCode,
  error::{ConfigurationError, Result},
};

/// Generated 18 distinct colors, one per district.
pub const DEFAULT_PALETTE: [&str; 18] = [
  "#544171", "#87D84A", "#CE572B", "#71D0C9", "#CC53D3", "#C59C76", "#5A8237", "#466158",
  "#D4B743", "#7199C7", "#C14088", "#7A6DCE", "#62471F", "#91D593", "#BF4C57", "#CC8BB9",
  "#C4BEBE", "#512834",
];

/// Letters that district codes never use because they read like digits.
const SKIPPED_LETTERS: [char; 2] = ['I', 'O'];

/// Brightening applied to a hovered feature, in percent.
pub const HIGHLIGHT_BRIGHTEN: u8 = 15;

/// Maps district codes onto a fixed palette without collisions.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
  palette: Vec<Color32>,
}

impl ColorAssigner {
  /// Validates that every code in use gets its own palette entry.
  pub fn new(palette: Vec<Color32>, codes: &[DistrictCode]) -> Result<Self> {
    if palette.is_empty() || palette.len() < codes.len() {
      return Err(ConfigurationError::PaletteTooSmall {
        palette: palette.len(),
        codes: codes.len(),
      });
    }
    if let Some((code, index)) = codes
      .iter()
      .map(|code| (code, palette_index(code)))
      .find(|(_, index)| *index >= palette.len())
    {
      return Err(ConfigurationError::CodeOutsidePalette {
        code: code.to_string(),
        index,
        palette: palette.len(),
      });
    }
    Ok(Self { palette })
  }

  /// Parses `#RRGGBB` strings into a palette.
  pub fn parse_palette<S: AsRef<str>>(palette: &[S]) -> Result<Vec<Color32>> {
    palette
      .iter()
      .map(|hex| {
        parse_color(hex.as_ref())
          .ok_or_else(|| ConfigurationError::InvalidColor(hex.as_ref().to_owned()))
      })
      .collect()
  }

  pub fn with_default_palette(codes: &[DistrictCode]) -> Result<Self> {
    Self::new(Self::parse_palette(&DEFAULT_PALETTE)?, codes)
  }

  /// The fill color of a district.
  /// Codes that were not validated at construction wrap around the palette in release builds.
  #[must_use]
  pub fn color_for(&self, code: &DistrictCode) -> Color32 {
    let index = palette_index(code);
    debug_assert!(
      index < self.palette.len(),
      "district {code} was not validated against the palette"
    );
    self.palette[index % self.palette.len()]
  }

  #[must_use]
  pub fn palette(&self) -> &[Color32] {
    &self.palette
  }
}

/// Offset of the leading letter from `A`, closing the gaps left by skipped letters.
#[must_use]
pub fn palette_index(code: &DistrictCode) -> usize {
  let letter = code.leading_letter();
  let offset = (letter as usize).saturating_sub('A' as usize);
  let gaps = SKIPPED_LETTERS
    .iter()
    .filter(|&&skipped| letter >= skipped)
    .count();
  offset.saturating_sub(gaps)
}

/// Raises every channel by `percent` of the full range, like `tinycolor.brighten`.
#[must_use]
pub fn brighten(color: Color32, percent: u8) -> Color32 {
  let amount = (255. * f32::from(percent) / 100.).round();
  #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
  let amount = amount as u8;
  let [r, g, b, a] = color.to_srgba_unmultiplied();
  Color32::from_rgba_unmultiplied(
    r.saturating_add(amount),
    g.saturating_add(amount),
    b.saturating_add(amount),
    a,
  )
}

/// Parse color string (hex or `rgb()`)
#[must_use]
pub fn parse_color(color_str: &str) -> Option<Color32> {
  let color_str = color_str.trim();

  if let Some(hex) = color_str.strip_prefix('#') {
    return parse_hex_color(hex);
  }

  if color_str.starts_with("rgb(") && color_str.ends_with(')') {
    return parse_rgb_color(&color_str[4..color_str.len() - 1]);
  }
  None
}

fn parse_hex_color(hex: &str) -> Option<Color32> {
  if !hex.is_ascii() {
    return None;
  }
  match hex.len() {
    3 => {
      let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
      let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
      let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
      Some(Color32::from_rgb(r, g, b))
    }
    6 => {
      let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
      let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
      let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
      Some(Color32::from_rgb(r, g, b))
    }
    _ => None,
  }
}

fn parse_rgb_color(rgb: &str) -> Option<Color32> {
  let parts: Vec<&str> = rgb.split(',').map(str::trim).collect();
  if let [r, g, b] = parts.as_slice() {
    Some(Color32::from_rgb(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?))
  } else {
    None
  }
}
