//! Actor extraction from pre-resolved identity headers.
//!
//! Authentication and role resolution happen upstream (gateway / auth
//! service); by the time a request reaches this server the actor identity
//! is already trusted and arrives as plain headers. The core never reads
//! ambient session state - staff handlers take an explicit `Actor`.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};

use crate::common::{Actor, Role};

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                format!("missing {} header", ACTOR_ID_HEADER),
            ))?;

        let role: Role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                format!("missing {} header", ACTOR_ROLE_HEADER),
            ))?
            .parse()
            .map_err(|e| (StatusCode::FORBIDDEN, e))?;

        Ok(Actor::new(id, role))
    }
}
