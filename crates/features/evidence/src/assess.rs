use crate::media;
use crate::model::{LanguageModel, ModelRequest};
use crate::parse::parse_assessment;
use crate::prompt;
use crate::report::ReportInput;
use brgy_domain::evidence::Assessment;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Runs the prompt/model/parse pipeline. Never fails: every problem degrades to `uncertain`.
#[derive(Debug, Clone)]
pub struct Assessor {
    model: Arc<dyn LanguageModel>,
}

impl Assessor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    #[instrument(skip_all, fields(report_id = report.id.as_deref()))]
    pub async fn assess(&self, report: &ReportInput) -> Assessment {
        let media = media::select(report);
        let request = ModelRequest { prompt: prompt::build(report, &media), image_url: media.image };

        let content = match self.model.complete(&request).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Evidence model call failed");
                return Assessment::uncertain(format!("Automated assessment unavailable: {e}"));
            }
        };

        match parse_assessment(&content) {
            Ok(assessment) => {
                info!(verdict = %assessment.verdict, score = assessment.score, "Evidence assessed");
                assessment
            }
            Err(e) => {
                warn!(error = %e, "Evidence model response was unusable");
                Assessment::uncertain(format!("Could not interpret the automated assessment: {e}"))
            }
        }
    }
}
