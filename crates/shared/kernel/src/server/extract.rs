use super::error::ApiError;
use super::state::ApiState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use brgy_domain::registry::FeatureSlice;

/// Extracts a registered feature slice from [`ApiState`] (cloned; slices are `Arc`-backed).
///
/// Rejects with 500 when the slice was never registered.
#[derive(Debug, Clone)]
pub struct Slice<T>(pub T);

impl<T> FromRequestParts<ApiState> for Slice<T>
where
    T: FeatureSlice + Clone,
{
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        Ok(Self(state.try_get_slice::<T>()?.clone()))
    }
}
