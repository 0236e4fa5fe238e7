//! Evidence assessment verdicts.

use serde::{Deserialize, Serialize};

string_enum! {
    /// How plausible a report's evidence looks.
    pub enum Verdict {
        LikelyReal => "likely_real",
        Uncertain => "uncertain",
        Suspicious => "suspicious",
    }
}

/// Score used whenever the assessment degrades to [`Verdict::Uncertain`].
pub const NEUTRAL_SCORE: f64 = 0.5;

/// The structured outcome of an evidence assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Assessment {
    pub verdict: Verdict,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f64,
    pub explanation: String,
}

impl Assessment {
    /// Builds an assessment, clamping `score` into `[0.0, 1.0]` (NaN becomes neutral).
    pub fn new(verdict: Verdict, score: f64, explanation: impl Into<String>) -> Self {
        let score = if score.is_nan() { NEUTRAL_SCORE } else { score.clamp(0.0, 1.0) };
        Self { verdict, score, explanation: explanation.into() }
    }

    /// The degraded result used when the model cannot give a usable answer.
    pub fn uncertain(explanation: impl Into<String>) -> Self {
        Self::new(Verdict::Uncertain, NEUTRAL_SCORE, explanation)
    }
}
