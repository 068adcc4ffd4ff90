use std::collections::HashSet;

use super::{host::MapHost, overlay::OverlayStore};
use crate::district::DistrictCode;

/// What a reconciliation pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
  pub attached: usize,
  pub detached: usize,
}

impl Reconciliation {
  #[must_use]
  pub fn is_noop(&self) -> bool {
    self.attached == 0 && self.detached == 0
  }
}

/// Attaches exactly the overlays whose code is in `visible` and detaches all others.
///
/// Only overlays whose attachment differs from the desired state are touched, so applying the
/// same set twice issues no host calls the second time.
pub fn apply(
  store: &mut OverlayStore,
  visible: &HashSet<DistrictCode>,
  host: &mut dyn MapHost,
) -> Reconciliation {
  let mut result = Reconciliation::default();
  for overlay in store.iter_mut() {
    let should_be_attached = visible.contains(overlay.code());
    if overlay.is_attached() == should_be_attached {
      continue;
    }
    if should_be_attached {
      host.attach(overlay);
      result.attached += 1;
    } else {
      host.detach(overlay);
      result.detached += 1;
    }
    overlay.set_attached(should_be_attached);
  }
  log::debug!(
    "Reconciled overlays: {} attached, {} detached",
    result.attached,
    result.detached
  );
  result
}
