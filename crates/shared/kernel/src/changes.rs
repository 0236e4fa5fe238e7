//! Best-effort publishing of row changes onto the event bus.

use brgy_domain::changes::RecordChange;
use brgy_event_bus::EventBus;
use tracing::{trace, warn};

/// Publishes `change` to current subscribers. Failures are logged, never returned.
pub fn publish_change(events: &EventBus, change: RecordChange) {
    let (table, action, id) = (change.table.clone(), change.action, change.id.clone());
    match events.publish(change) {
        Ok(delivered) => trace!(%table, %action, %id, delivered, "Change published"),
        Err(e) => warn!(error = %e, %table, %action, %id, "Failed to publish change"),
    }
}
