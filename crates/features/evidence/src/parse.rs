//! Turns a free-form completion into an [`Assessment`].

use crate::error::EvidenceError;
use brgy_domain::evidence::{Assessment, Verdict};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawAssessment {
    verdict: String,
    score: f64,
    #[serde(default)]
    explanation: String,
}

/// Extracts the verdict object from `content`.
///
/// Code fences and prose around the object are tolerated. Balanced `{...}` spans are tried
/// in order and the first one that decodes as a verdict wins.
///
/// # Errors
/// Returns [`EvidenceError::Parse`] when no object is found, or with the first candidate's
/// failure when none is valid JSON carrying a known verdict.
pub fn parse_assessment(content: &str) -> Result<Assessment, EvidenceError> {
    let mut first_error = None;
    for object in objects(content) {
        match decode(object) {
            Ok(assessment) => return Ok(assessment),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| EvidenceError::Parse {
        message: "No JSON object in model response".into(),
        context: None,
    }))
}

fn decode(object: &str) -> Result<Assessment, EvidenceError> {
    let raw: RawAssessment = serde_json::from_str(object).map_err(|e| EvidenceError::Parse {
        message: e.to_string().into(),
        context: Some("Decoding verdict object".into()),
    })?;

    let verdict = raw.verdict.parse::<Verdict>().map_err(|e| EvidenceError::Parse {
        message: e.to_string().into(),
        context: Some("Reading verdict".into()),
    })?;

    let explanation = raw.explanation.trim();
    let explanation =
        if explanation.is_empty() { "No explanation provided by the model." } else { explanation };

    Ok(Assessment::new(verdict, raw.score, explanation))
}

/// Balanced `{...}` spans of `content`, left to right. An unclosed `{` is skipped.
fn objects(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = content;
    std::iter::from_fn(move || {
        loop {
            let tail = &rest[rest.find('{')?..];
            if let Some(object) = balanced(tail) {
                rest = &tail[object.len()..];
                return Some(object);
            }
            rest = &tail[1..];
        }
    })
}

/// The balanced span at the start of `tail` (which begins with `{`), skipping braces inside
/// JSON strings.
fn balanced(tail: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in tail.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&tail[..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use brgy_domain::evidence::NEUTRAL_SCORE;

    #[test]
    fn parses_plain_json() {
        let a = parse_assessment(r#"{"verdict":"likely_real","score":0.82,"explanation":"Matches."}"#)
            .unwrap();
        assert_eq!(a.verdict, Verdict::LikelyReal);
        assert!((a.score - 0.82).abs() < f64::EPSILON);
        assert_eq!(a.explanation, "Matches.");
    }

    #[test]
    fn tolerates_fences_and_prose() {
        let content = "Here is my assessment:\n```json\n{\"verdict\": \"suspicious\", \"score\": 0.7, \
                       \"explanation\": \"Watermark {stock}.\"}\n```\nThanks!";
        let a = parse_assessment(content).unwrap();
        assert_eq!(a.verdict, Verdict::Suspicious);
        assert_eq!(a.explanation, "Watermark {stock}.");
    }

    #[test]
    fn skips_braced_prose_before_the_verdict() {
        let content = r#"I saw {stock} marks. {"verdict":"suspicious","score":0.6,"explanation":"x"}"#;
        let a = parse_assessment(content).unwrap();
        assert_eq!(a.verdict, Verdict::Suspicious);
        assert!((a.score - 0.6).abs() < f64::EPSILON);

        let content = r#"{"verdict":"fake","score":1} then {"verdict":"likely_real","score":0.9}"#;
        assert_eq!(parse_assessment(content).unwrap().verdict, Verdict::LikelyReal);
    }

    #[test]
    fn clamps_scores() {
        let a = parse_assessment(r#"{"verdict":"uncertain","score":7,"explanation":"x"}"#).unwrap();
        assert!((a.score - 1.0).abs() < f64::EPSILON);
        let a = parse_assessment(r#"{"verdict":"uncertain","score":-2,"explanation":"x"}"#).unwrap();
        assert!(a.score.abs() < f64::EPSILON);
        assert!((Assessment::uncertain("x").score - NEUTRAL_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unusable_content() {
        for content in ["", "no json here", "{\"verdict\": \"fake\", \"score\": 0.1}", "{\"verdict\": "] {
            assert!(
                matches!(parse_assessment(content), Err(EvidenceError::Parse { .. })),
                "{content:?} should not parse"
            );
        }
    }
}
