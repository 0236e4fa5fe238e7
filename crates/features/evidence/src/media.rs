//! Media classification and the image-first selection policy.

use crate::report::ReportInput;

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".webm", ".avi", ".mkv", ".m4v", ".3gp"];
const IMAGE_EXTENSIONS: &[&str] =
    &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".heic", ".heif"];
const VIDEO_FOLDERS: &[&str] = &["/videos/", "report-videos"];
const IMAGE_FOLDERS: &[&str] = &["/images/", "report-images", "/photos/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

/// Classifies a media URL by its path, ignoring query string, fragment and case.
/// Video signals win over image signals.
#[must_use]
pub fn classify(url: &str) -> MediaKind {
    let path = url.split(['?', '#']).next().unwrap_or_default().to_ascii_lowercase();
    let matches = |extensions: &[&str], folders: &[&str]| {
        extensions.iter().any(|ext| path.ends_with(ext))
            || folders.iter().any(|folder| path.contains(folder))
    };

    if matches(VIDEO_EXTENSIONS, VIDEO_FOLDERS) {
        MediaKind::Video
    } else if matches(IMAGE_EXTENSIONS, IMAGE_FOLDERS) {
        MediaKind::Image
    } else {
        MediaKind::Unknown
    }
}

/// What the assessment will look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSelection {
    /// URL handed to the vision model; never a video.
    pub image: Option<String>,
    /// A video was attached (it is mentioned in the prompt, not inspected).
    pub has_video: bool,
}

/// Picks the image to inspect: the first recognized image, else the first unclassified URL
/// when the client hinted `media_type = "image"`.
#[must_use]
pub fn select(report: &ReportInput) -> MediaSelection {
    let mut first_image = None;
    let mut first_unknown = None;
    let mut has_video = false;

    for url in report.media_candidates() {
        match classify(url) {
            MediaKind::Image if first_image.is_none() => first_image = Some(url),
            MediaKind::Unknown if first_unknown.is_none() => first_unknown = Some(url),
            MediaKind::Video => has_video = true,
            _ => {}
        }
    }

    let image = first_image.or_else(|| first_unknown.filter(|_| report.hints_image()));
    MediaSelection { image: image.map(str::to_owned), has_video }
}
