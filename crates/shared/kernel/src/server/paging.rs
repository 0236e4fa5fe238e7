use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 200;

/// `limit`/`offset` query parameters shared by every list route.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Paging {
    /// Page size; defaults to 50 and is capped at 200.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Paging {
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.map_or(DEFAULT_LIMIT, |l| l.clamp(1, MAX_LIMIT))
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or_default()
    }
}
