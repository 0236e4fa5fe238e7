use crate::media::MediaSelection;
use crate::report::ReportInput;
use std::fmt::Write as _;

const INSTRUCTIONS: &str = "You review evidence attached to incident reports filed with a barangay \
(village) office. Judge conservatively whether the evidence plausibly matches the reported \
incident. Flag signs of fabrication, reused stock imagery or mismatch with the description, \
but do not accuse reporters without clear indicators; when unsure, answer \"uncertain\".";

const RESPONSE_FORMAT: &str = "Respond with only a JSON object of the form \
{\"verdict\": \"likely_real\" | \"uncertain\" | \"suspicious\", \"score\": <number from 0 to 1>, \
\"explanation\": \"<one or two sentences>\"}. The score is your confidence in the verdict.";

/// Builds the user prompt for a report and its selected media.
#[must_use]
pub fn build(report: &ReportInput, media: &MediaSelection) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nReport details:\n");
    field(&mut prompt, "Category", &report.category);
    field(&mut prompt, "Title", &report.title);
    field(&mut prompt, "Description", &report.description);
    field(&mut prompt, "Location", &report.location);
    if let Some(notes) = report.responder_notes.as_deref() {
        field(&mut prompt, "Responder notes", notes);
    }

    prompt.push('\n');
    if media.image.is_some() {
        prompt.push_str("The attached image is the photo evidence submitted with this report.\n");
    } else if media.has_video {
        prompt.push_str(
            "A video was attached but cannot be inspected; assess from the text alone and \
             lean towards \"uncertain\".\n",
        );
    } else {
        prompt.push_str("No media evidence was attached; assess from the text alone.\n");
    }

    prompt.push('\n');
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}

fn field(prompt: &mut String, label: &str, value: &str) {
    let value = value.trim();
    let value = if value.is_empty() { "(not provided)" } else { value };
    let _ = writeln!(prompt, "- {label}: {value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ReportInput {
        ReportInput {
            category: "Flooding".into(),
            title: "Street flooded".into(),
            location: "Purok 3".into(),
            ..ReportInput::default()
        }
    }

    #[test]
    fn includes_report_fields_and_placeholders() {
        let prompt = build(&report(), &MediaSelection::default());
        assert!(prompt.contains("- Category: Flooding"));
        assert!(prompt.contains("- Description: (not provided)"));
        assert!(prompt.contains("No media evidence was attached"));
        assert!(prompt.contains("\"likely_real\""));
    }

    #[test]
    fn mentions_uninspected_video() {
        let media = MediaSelection { image: None, has_video: true };
        assert!(build(&report(), &media).contains("A video was attached but cannot be inspected"));
    }
}
