//! Cap on in-flight requests

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use skillmatch_common::errors::AppError;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Wait for one of `max_concurrent_requests` permits before handling
pub async fn limit_concurrency(
    State(permits): State<Arc<Semaphore>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|_| AppError::ServiceUnavailable {
            message: "request permits closed".to_string(),
        })?;

    Ok(next.run(request).await)
}
