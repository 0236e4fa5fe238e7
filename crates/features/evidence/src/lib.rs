//! Evidence assessment slice.
//!
//! `POST /functions/assess-evidence` asks an external vision/text model whether a report's
//! photo evidence plausibly matches the incident. The answer is always a verdict: transport
//! failures, missing keys and unusable completions degrade to `uncertain` with a neutral score.
//! When the request names a report id, the verdict is merged into that `reports` row.

mod assess;
mod error;
mod handlers;
pub mod media;
mod model;
pub mod parse;
pub mod prompt;
mod report;
mod store;

pub use crate::assess::Assessor;
pub use crate::error::{EvidenceError, EvidenceErrorExt};
pub use crate::model::{LanguageModel, ModelRequest, OpenAiCompatible};
pub use crate::report::{AssessRequest, ReportInput};
pub use crate::store::{EvidenceStore, SurrealEvidenceStore};

use brgy_database::Database;
use brgy_domain::config::ApiConfig;
use brgy_domain::registry::{FeatureSlice, InitializedSlice};
use brgy_event_bus::EventBus;
use brgy_kernel::server::ApiState;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

#[derive(Debug)]
pub struct EvidenceInner {
    pub assessor: Assessor,
    pub store: Arc<dyn EvidenceStore>,
    pub events: EventBus,
}

/// Evidence slice state.
#[derive(Debug, Clone)]
pub struct Evidence {
    inner: Arc<EvidenceInner>,
}

impl Evidence {
    pub fn new(inner: EvidenceInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Wires the slice from explicit parts (custom models or stores).
    pub fn from_parts(
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn EvidenceStore>,
        events: EventBus,
    ) -> Self {
        Self::new(EvidenceInner { assessor: Assessor::new(model), store, events })
    }
}

impl Deref for Evidence {
    type Target = EvidenceInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FeatureSlice for Evidence {
    fn name(&self) -> &'static str {
        "evidence"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Initialize the evidence slice with the configured OpenAI-compatible model.
///
/// # Errors
/// Returns [`EvidenceError::Transport`] if the HTTP client cannot be built.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, EvidenceError> {
    let model = OpenAiCompatible::new(&config.evidence)?;
    if config.evidence.api_key.is_none() {
        tracing::warn!("No evidence API key configured; assessments will be 'uncertain'");
    }

    let slice = Evidence::from_parts(
        Arc::new(model),
        Arc::new(SurrealEvidenceStore::new(database.clone())),
        events.clone(),
    );
    tracing::info!(
        vision_model = %config.evidence.vision_model,
        text_model = %config.evidence.text_model,
        "Evidence slice initialized"
    );
    Ok(InitializedSlice::new(slice))
}

pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handlers::assess_evidence))
}
