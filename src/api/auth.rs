//! Caller identity forwarded by the upstream authentication gateway.
//!
//! Bearer-token verification happens before requests reach this service;
//! the gateway forwards the verified user id in the `X-User-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;
use crate::error::SwapError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, extracted from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = SwapError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| SwapError::Unauthorized("missing user identity".to_string()))?
            .to_str()
            .map_err(|_| SwapError::Unauthorized("malformed user identity".to_string()))?;
        let uuid = raw
            .trim()
            .parse::<uuid::Uuid>()
            .map_err(|_| SwapError::Unauthorized("malformed user identity".to_string()))?;
        Ok(Self(UserId::from_uuid(uuid)))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CurrentUser, SwapError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let Ok(request) = builder.body(()) else {
            panic!("valid request");
        };
        let (mut parts, ()) = request.into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn parses_uuid_header() {
        let id = uuid::Uuid::new_v4();
        let Ok(CurrentUser(user)) = extract(Some(&id.to_string())).await else {
            panic!("extraction failed");
        };
        assert_eq!(*user.as_uuid(), id);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(SwapError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn garbage_header_is_unauthorized() {
        assert!(matches!(
            extract(Some("not-a-uuid")).await,
            Err(SwapError::Unauthorized(_))
        ));
    }
}
