//! Recommendation handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::AppState;
use skillmatch_common::errors::{AppError, Result};
use skillmatch_search::Recommendation;

/// Recommendation request
#[derive(Debug, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1, message = "query must be a non-empty string"))]
    pub query: String,
}

impl RecommendRequest {
    /// Extract the query from a JSON body, rejecting missing or non-string values
    fn from_payload(payload: std::result::Result<Json<Value>, JsonRejection>) -> Result<Self> {
        let Json(body) = payload.map_err(|rejection| AppError::InvalidFormat {
            message: rejection.body_text(),
        })?;

        match body.get("query") {
            None | Some(Value::Null) => Err(AppError::MissingField {
                field: "query".to_string(),
            }),
            Some(Value::String(query)) => Ok(Self {
                query: query.clone(),
            }),
            Some(_) => Err(AppError::Validation {
                message: "query must be a string".to_string(),
                field: Some("query".to_string()),
            }),
        }
    }
}

/// Recommendation response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<Recommendation>,
}

/// Recommend up to ten assessments for a job description, query or URL
pub async fn recommend(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecommendResponse>> {
    let request = RecommendRequest::from_payload(payload)?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("query".to_string()),
    })?;

    let engine = state.engine.get().ok_or(AppError::EngineNotInitialized)?;
    let recommended_assessments = engine.recommend(&request.query).await?;

    Ok(Json(RecommendResponse {
        recommended_assessments,
    }))
}
