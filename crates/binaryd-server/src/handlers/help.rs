//! Usage message listing the configured commands

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use binaryd_config::CommandsConfig;

use crate::state::AppState;

const USAGE: &str = "
binaryd HTTP wrapper to execute pre-defined commands through HTTP.

Execute command and get plain text result:
    - curl -X GET http://xxx.xxx.xxx.xxx:9099
    - curl -X GET http://xxx.xxx.xxx.xxx:9099/<command>
    - curl -X GET http://xxx.xxx.xxx.xxx:9099/ps

Execute command and get result as JSON
    - curl -X GET http://xxx.xxx.xxx.xxx:9099/json/<command>
    - curl -X GET http://xxx.xxx.xxx.xxx:9099/json/ps

Available commands are:
";

/// Usage text followed by one command name per line
pub fn help_text(commands: &CommandsConfig) -> String {
    let mut text = String::from(USAGE);
    for name in commands.names() {
        text.push_str(name);
        text.push('\n');
    }
    text
}

/// Render the usage message as a `400 Bad Request`
pub fn render(state: &AppState) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "text/plain")],
        help_text(&state.commands),
    )
        .into_response()
}

/// Fallback for `/` and every path that names no command
pub async fn help_message(State(state): State<AppState>) -> Response {
    render(&state)
}
