//! Command execution endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::{error::ApiResult, handlers::help, state::AppState};

/// `GET /<command>`: combined output as plain text
pub async fn execute_plain(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let Some(command) = state.commands.get(&name) else {
        warn!(name = %name, "Could not find pre-defined command in config");
        return Ok(help::render(&state));
    };

    let result = state.run_command(command).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        result.output,
    )
        .into_response())
}

/// `GET /json/<command>`: `{"stdout", "rc", "execution_unix_timestamp_sec"}`
pub async fn execute_json(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let Some(command) = state.commands.get(&name) else {
        warn!(name = %name, "Could not find pre-defined command in config");
        return Ok(help::render(&state));
    };

    let result = state.run_command(command).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}
