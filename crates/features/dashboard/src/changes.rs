//! Realtime change feed.
//!
//! A [`Subscription`] is a bus receiver plus a table filter. Lagging subscribers skip ahead
//! (the bus logs how many events were dropped); the subscription ends when the bus shuts down.

use crate::Dashboard;
use crate::error::{DashboardError, DashboardErrorExt};
use crate::support::query;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::response::sse::{Event, KeepAlive, Sse};
use brgy_domain::changes::RecordChange;
use brgy_domain::constants::{DASHBOARD_TAG, OBSERVED_TABLES};
use brgy_event_bus::{EventBus, EventReceiverExt};
use brgy_identity::Caller;
use brgy_kernel::server::{ApiError, ErrorBody, Slice};
use futures_util::{Stream, StreamExt, stream};
use fxhash::FxHashSet;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use utoipa::IntoParams;

#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<Arc<RecordChange>>,
    tables: Option<FxHashSet<String>>,
}

impl Subscription {
    /// Subscribes to changes of `tables`; an empty list means every table.
    ///
    /// # Errors
    /// Returns [`DashboardError::Feed`] if the bus cannot open the channel.
    pub fn new<I, S>(events: &EventBus, tables: I) -> Result<Self, DashboardError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tables: FxHashSet<String> = tables.into_iter().map(Into::into).collect();
        let receiver = events.subscribe::<RecordChange>().context("Subscribing to record changes")?;
        Ok(Self { receiver, tables: (!tables.is_empty()).then_some(tables) })
    }

    #[must_use]
    pub fn accepts(&self, change: &RecordChange) -> bool {
        self.tables.as_ref().is_none_or(|tables| tables.contains(&change.table))
    }

    /// The next matching change, or `None` once the bus is closed.
    pub async fn next(&mut self) -> Option<Arc<RecordChange>> {
        loop {
            let change = self.receiver.next_event().await?;
            if self.accepts(&change) {
                return Some(change);
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Arc<RecordChange>> + Send {
        stream::unfold(self, |mut subscription| async move {
            subscription.next().await.map(|change| (change, subscription))
        })
    }
}

/// Parses `a,b` into known table names. Blank input selects every table.
///
/// # Errors
/// Returns [`DashboardError::Validation`] for tables that are not on the feed.
pub fn parse_tables(raw: Option<&str>) -> Result<Vec<String>, DashboardError> {
    let mut tables = Vec::new();
    for name in raw.unwrap_or_default().split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !OBSERVED_TABLES.contains(&name) {
            return Err(DashboardError::validation(format!("Table '{name}' has no change feed")));
        }
        tables.push(name.to_owned());
    }
    Ok(tables)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChangesQuery {
    /// Comma-separated table names; omit for all tables.
    pub tables: Option<String>,
}

#[utoipa::path(
    get,
    path = "/changes",
    params(ChangesQuery),
    responses(
        (status = OK, description = "Server-sent `RecordChange` events named after their table",
            content_type = "text/event-stream", body = RecordChange),
        (status = BAD_REQUEST, description = "Unknown table", body = ErrorBody),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = DASHBOARD_TAG,
)]
pub(crate) async fn changes(
    caller: Caller,
    Slice(dashboard): Slice<Dashboard>,
    params: Result<Query<ChangesQuery>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let params = query(params)?;
    let tables = parse_tables(params.tables.as_deref())?;
    debug!(admin_id = %caller.admin.id, ?tables, "Change feed subscribed");

    let subscription = Subscription::new(&dashboard.events, tables)?;
    let events = subscription.into_stream().filter_map(|change| async move {
        match Event::default().event(change.table.as_str()).json_data(change.as_ref()) {
            Ok(event) => Some(Ok::<_, Infallible>(event)),
            Err(e) => {
                warn!(error = %e, table = %change.table, "Dropping unencodable change");
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_are_validated() {
        assert!(parse_tables(None).unwrap().is_empty());
        assert_eq!(parse_tables(Some(" reports, emergencies ,")).unwrap(), ["reports", "emergencies"]);
        assert!(parse_tables(Some("reports,audit_logs")).is_err());
    }
}
