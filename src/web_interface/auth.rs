//! Bearer credential check.
//!
//! Every API endpoint requires `Authorization: Bearer <token>` matching the
//! server-held secret. A missing or mismatched token rejects with 401; a
//! server with no secret configured rejects with 500. CORS preflight never
//! reaches this filter; the preflight route answers first.

use std::convert::Infallible;

use warp::http::StatusCode;
use warp::{reply, Filter, Rejection, Reply};

use super::types::ApiError;

#[derive(Debug)]
pub struct Unauthorized;
impl warp::reject::Reject for Unauthorized {}

#[derive(Debug)]
pub struct MissingSecret;
impl warp::reject::Reject for MissingSecret {}

/// Filter that passes only requests carrying the expected bearer token.
pub fn require_bearer(
    secret: Option<String>,
) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and_then(move |header: Option<String>| {
            let secret = secret.clone();
            async move {
                let Some(secret) = secret else {
                    return Err(warp::reject::custom(MissingSecret));
                };
                match header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
                    Some(token) if token.trim() == secret => Ok(()),
                    _ => Err(warp::reject::custom(Unauthorized)),
                }
            }
        })
        .untuple_one()
}

/// Converts rejections into the JSON error replies the API promises.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.find::<MissingSecret>().is_some() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server API token is not configured",
        )
    } else if err.find::<Unauthorized>().is_some() {
        (StatusCode::UNAUTHORIZED, "Invalid or missing bearer token")
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "No such endpoint")
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, "Malformed request body")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    };

    Ok(reply::with_status(
        reply::json(&ApiError::new(message)),
        status,
    ))
}
