//! Hub User Context Extractor
//!
//! Optional extractor for HubUserContext from request extensions.
//! Returns None if Hub integration is disabled or no Hub context is present.

use super::HubUserContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Optional Hub user context extractor
///
/// Extracts HubUserContext from request extensions if available.
/// Unlike AuthContextExtractor, this is optional and returns None if not found.
#[derive(Debug, Clone)]
pub struct HubContextExtractor(pub Option<HubUserContext>);

impl<S> FromRequestParts<S> for HubContextExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let hub_context = parts.extensions.get::<HubUserContext>().cloned();
        Ok(HubContextExtractor(hub_context))
    }
}
