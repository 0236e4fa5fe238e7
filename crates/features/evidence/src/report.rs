use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /functions/assess-evidence`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssessRequest {
    pub report: ReportInput,
}

/// The report fields the assessment reads. Everything but the core text is optional.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReportInput {
    /// When present, the verdict is written back onto this `reports` row.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub responder_notes: Option<String>,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Client hint such as `"image"` or `"video"`.
    #[serde(default)]
    pub media_type: Option<String>,
}

impl ReportInput {
    /// All attached media, in precedence order: `image_url`, `media_urls`, `video_url`.
    /// Blank entries are dropped.
    pub fn media_candidates(&self) -> impl Iterator<Item = &str> {
        self.image_url
            .iter()
            .chain(self.media_urls.iter().flatten())
            .chain(self.video_url.iter())
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
    }

    /// Whether the client labelled the media as an image.
    #[must_use]
    pub fn hints_image(&self) -> bool {
        self.media_type.as_deref().is_some_and(|t| t.trim().eq_ignore_ascii_case("image"))
    }
}
