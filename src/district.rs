use std::{
  borrow::Borrow,
  collections::{BTreeMap, HashMap},
  fmt,
  path::Path,
  str::FromStr,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Short identifier of a top-level district, e.g. `A`.
/// Always starts with an ASCII uppercase letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistrictCode(String);

impl DistrictCode {
  pub fn new(code: impl Into<String>) -> Result<Self> {
    let code = code.into();
    match code.chars().next() {
      Some(c) if c.is_ascii_uppercase() => Ok(Self(code)),
      _ => Err(ConfigurationError::InvalidDistrictCode(code)),
    }
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The letter the color assignment is based on.
  #[must_use]
  pub fn leading_letter(&self) -> char {
    self.0.chars().next().unwrap_or('A')
  }
}

impl FromStr for DistrictCode {
  type Err = ConfigurationError;

  fn from_str(s: &str) -> Result<Self> {
    Self::new(s)
  }
}

impl TryFrom<String> for DistrictCode {
  type Error = ConfigurationError;

  fn try_from(value: String) -> Result<Self> {
    Self::new(value)
  }
}

impl From<DistrictCode> for String {
  fn from(code: DistrictCode) -> Self {
    code.0
  }
}

impl Borrow<str> for DistrictCode {
  fn borrow(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for DistrictCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Identifier of a single DCCA area feature, e.g. `A01`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(String);

impl AreaId {
  #[must_use]
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for AreaId {
  fn from(id: &str) -> Self {
    Self(id.to_owned())
  }
}

impl Borrow<str> for AreaId {
  fn borrow(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for AreaId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// All localized variants of one name, keyed by locale (`T`, `E`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedName(BTreeMap<String, String>);

impl LocalizedName {
  #[must_use]
  pub fn get(&self, locale: &str) -> Option<&str> {
    self.0.get(locale).map(String::as_str)
  }
}

impl<const N: usize> From<[(&str, &str); N]> for LocalizedName {
  fn from(variants: [(&str, &str); N]) -> Self {
    Self(
      variants
        .into_iter()
        .map(|(locale, name)| (locale.to_owned(), name.to_owned()))
        .collect(),
    )
  }
}

/// A lookup from code to display name. Only one locale is ever consulted.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
  names: HashMap<String, LocalizedName>,
  locale: String,
}

impl NameTable {
  #[must_use]
  pub fn new(names: HashMap<String, LocalizedName>, locale: impl Into<String>) -> Self {
    Self {
      names,
      locale: locale.into(),
    }
  }

  pub fn from_json_str(json: &str, locale: impl Into<String>) -> serde_json::Result<Self> {
    Ok(Self::new(serde_json::from_str(json)?, locale))
  }

  pub fn from_file(path: &Path, locale: impl Into<String>) -> Result<Self> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_str(&json, locale).map_err(|source| ConfigurationError::Json {
      path: path.to_path_buf(),
      source,
    })
  }

  /// The default-locale name for `key`.
  #[must_use]
  pub fn name(&self, key: &str) -> Option<&str> {
    self.names.get(key)?.get(&self.locale)
  }

  /// `"<name> (<key>)"`, or just the key when no name is known.
  #[must_use]
  pub fn label(&self, key: &str) -> String {
    match self.name(key) {
      Some(name) => format!("{name} ({key})"),
      None => {
        log::warn!("No {} name for {key}", self.locale);
        key.to_owned()
      }
    }
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.names.keys().map(String::as_str)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.names.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

/// The canonical district list, derived from the district name table.
#[derive(Debug, Clone)]
pub struct Districts {
  codes: Vec<DistrictCode>,
  names: NameTable,
}

impl Districts {
  pub fn new(names: NameTable) -> Result<Self> {
    let codes = names
      .keys()
      .map(DistrictCode::new)
      .collect::<Result<Vec<_>>>()?
      .into_iter()
      .sorted()
      .collect();
    Ok(Self { codes, names })
  }

  /// All district codes in ascending order.
  #[must_use]
  pub fn codes(&self) -> &[DistrictCode] {
    &self.codes
  }

  /// Checklist labels, `"<name> (<code>)"`.
  #[must_use]
  pub fn labels(&self) -> BTreeMap<DistrictCode, String> {
    self
      .codes
      .iter()
      .map(|code| (code.clone(), self.names.label(code.as_str())))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names() -> NameTable {
    NameTable::from_json_str(
      r#"{
        "B": {"T": "灣仔", "E": "Wan Chai"},
        "A": {"T": "中西區", "E": "Central and Western"},
        "D": {"T": "南區", "E": "Southern"}
      }"#,
      "E",
    )
    .unwrap()
  }

  #[test]
  fn codes_are_validated() {
    assert!(DistrictCode::new("A").is_ok());
    assert!(DistrictCode::new("K").is_ok());
    assert!(matches!(
      DistrictCode::new("a"),
      Err(ConfigurationError::InvalidDistrictCode(_))
    ));
    assert!(DistrictCode::new("").is_err());
    assert!(DistrictCode::new("1").is_err());
  }

  #[test]
  fn codes_are_sorted() {
    let districts = Districts::new(names()).unwrap();
    let codes: Vec<_> = districts.codes().iter().map(DistrictCode::as_str).collect();
    assert_eq!(codes, ["A", "B", "D"]);
  }

  #[test]
  fn labels_use_default_locale() {
    let districts = Districts::new(names()).unwrap();
    let labels = districts.labels();
    assert_eq!(labels[&DistrictCode::new("B").unwrap()], "Wan Chai (B)");
  }

  #[test]
  fn label_without_name_falls_back_to_key() {
    let table = names();
    assert_eq!(table.name("Z"), None);
    assert_eq!(table.label("Z"), "Z");

    let chinese = NameTable::new(
      HashMap::from([("A".to_owned(), LocalizedName::from([("T", "中西區")]))]),
      "T",
    );
    assert_eq!(chinese.label("A"), "中西區 (A)");
  }

  #[test]
  fn code_deserializes_with_validation() {
    let code: DistrictCode = serde_json::from_str("\"C\"").unwrap();
    assert_eq!(code.as_str(), "C");
    assert!(serde_json::from_str::<DistrictCode>("\"c\"").is_err());
  }
}
