use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Domain failures of the plan engine. Storage errors propagate untouched
/// and unretried; the HTTP layer decides presentation.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error(
        "no meals available in catalog (breakfast: {breakfast}, lunch: {lunch}, \
         dinner: {dinner}, snack: {snack}); add meals first"
    )]
    CatalogExhausted {
        breakfast: u64,
        lunch: u64,
        dinner: u64,
        snack: u64,
    },

    #[error("onboarding not completed")]
    ProfileIncomplete,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let status = match self {
            // Retryable-later: the catalog needs data, not the user.
            PlanError::CatalogExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PlanError::ProfileIncomplete => StatusCode::BAD_REQUEST,
            PlanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
