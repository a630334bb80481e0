use crate::models::{ChangeEvent, Product, StatusLabel};
use crate::status_store::StatusStore;

/// Record `status` for the product and report whether it is a new actionable state.
///
/// An event is produced only when the status is actionable and differs from the
/// stored one. A product with no stored status always counts as changed. The
/// store is updated either way, so an unchanged status never alerts twice.
pub fn detect(product: &Product, status: StatusLabel, store: &mut StatusStore) -> Option<ChangeEvent> {
    let previous = store.record(&product.url, status);

    if status.is_actionable() && previous != Some(status) {
        Some(ChangeEvent::new(product, status))
    } else {
        None
    }
}
