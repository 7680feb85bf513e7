//! Poster endpoint.
//!
//! `GET /{movie}/{year}` resolves the poster and streams the stored file.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, error, warn};

use posterd_core::{Resolution, ResolveError};

use crate::state::AppState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /{movie}/{year}
///
/// Answers with the poster file, 404 without a body when no poster exists,
/// 502 when the remote side failed and 500 when local storage failed.
pub async fn get_poster(
    State(state): State<Arc<AppState>>,
    Path((movie, year)): Path<(String, String)>,
    request: Request,
) -> Response {
    // Non-numeric years never match the route's integer segment.
    let Ok(year) = year.parse::<u32>() else {
        debug!("Rejecting non-numeric year {:?} for {:?}", year, movie);
        return StatusCode::NOT_FOUND.into_response();
    };

    match state.resolver().resolve(&movie, year).await {
        Ok(Resolution::Resolved { path, origin }) => {
            debug!("Serving {} ({:?}) for {} {}", path.display(), origin, movie, year);
            match ServeFile::new(&path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            }
        }
        Ok(Resolution::NotFound { stage, reason }) => {
            debug!("No poster for {} {} ({:?}): {}", movie, year, stage, reason);
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => error_response(&movie, year, e),
    }
}

fn error_response(movie: &str, year: u32, err: ResolveError) -> Response {
    let status = if err.is_storage() {
        error!("Storage failure resolving {} {}: {}", movie, year, err);
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        warn!("Remote failure resolving {} {}: {}", movie, year, err);
        StatusCode::BAD_GATEWAY
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterd_core::{CacheError, FetchError};

    #[test]
    fn test_remote_failure_maps_to_bad_gateway() {
        let err = ResolveError::RemoteFetch(FetchError::Status {
            url: "https://upload.example/x.jpg".to_string(),
            status: 503,
        });
        let response = error_response("dune", 2021, err);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_storage_failure_maps_to_internal_error() {
        let err = ResolveError::Cache(CacheError::Malformed {
            line: 3,
            reason: "expected 3 fields".to_string(),
        });
        let response = error_response("dune", 2021, err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
