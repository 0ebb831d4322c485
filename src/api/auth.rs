use crate::routing_utils::UnauthorizedErrorResponse;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the signed-in user's ID. Credential validation happens at
/// the gateway in front of this service; by the time a request arrives here
/// the gateway has already verified the user and injected this header.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor providing the ID of the signed-in user making the request.
/// Requests without a usable identity are rejected with a 401.
pub struct AuthenticatedUser(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = UnauthorizedErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|raw_id| raw_id.parse::<i32>().ok());

        match user_id {
            Some(id) => Ok(AuthenticatedUser(id)),
            None => Err(UnauthorizedErrorResponse),
        }
    }
}
