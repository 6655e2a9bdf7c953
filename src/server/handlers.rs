//! Route handlers
//!
//! Three routes stitch the flow together: redirect the browser to the
//! provider, handle the provider callback (exchange the code, call the
//! downstream API with the bearer token), and render the result. Every
//! failure surfaces as the same generic error page with a correlation id.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::CodeFlowError;

use super::AppState;

#[derive(Error, Debug)]
pub enum AppError {
    /// Provider sent `error=` back instead of a code
    #[error("provider rejected the authorization request: {error}: {description}")]
    ProviderRejection { error: String, description: String },

    /// Callback carried neither a code nor an error
    #[error("callback did not include an authorization code")]
    MissingCode,

    #[error(transparent)]
    CodeFlow(#[from] CodeFlowError),

    /// Downstream API answered with a non-success status
    #[error("downstream API call failed: {status}: {body}")]
    Downstream { status: StatusCode, body: String },

    /// Transport failure or undecodable body from the downstream API
    #[error("downstream API request failed: {0}")]
    DownstreamRequest(#[source] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Correlation id shown to the user and attached to the log line,
        // the only link between the two
        let request_id = Uuid::new_v4();
        tracing::error!(%request_id, error = %self, "request failed");

        let status = match &self {
            AppError::MissingCode => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };

        (status, Html(error_page(&request_id.to_string()))).into_response()
    }
}

/// One downstream record, passed through from the API response unmodified.
#[derive(Debug, Deserialize)]
pub struct Forecast {
    pub date: String,
    pub temperature: i32,
    pub summary: String,
}

/// Query parameters the provider appends when redirecting back.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Landing page with a link to start the flow
pub async fn index() -> Html<String> {
    Html(page(
        "Weather Forecast Client",
        r#"<h1>Weather Forecast Client</h1>
        <p>Authorize with the identity provider, then fetch the protected forecast API.</p>
        <p><a class="button" href="/Home/InvokeApi">Invoke API</a></p>"#,
    ))
}

/// Redirect the browser to the provider's authorize endpoint.
pub async fn invoke_api(State(state): State<Arc<AppState>>) -> Redirect {
    let endpoint =
        state
            .code_flow
            .authorization_url(&state.callback_url, &state.audience, &state.scope);

    Redirect::temporary(&endpoint)
}

/// Provider callback: exchange the code, call the downstream API with the
/// bearer token, render the records.
pub async fn invoke_api_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackQuery>,
) -> Result<Html<String>, AppError> {
    if let Some(error) = params.error.filter(|e| !e.is_empty()) {
        return Err(AppError::ProviderRejection {
            error,
            description: params.error_description.unwrap_or_default(),
        });
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingCode)?;

    let access_token = state
        .code_flow
        .exchange_code(&code, &state.callback_url)
        .await?;

    let response = state
        .http_client
        .get(&state.forecast_api_url)
        .bearer_auth(&access_token)
        .send()
        .await
        .map_err(AppError::DownstreamRequest)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Downstream { status, body });
    }

    let forecast: Vec<Forecast> = response
        .json()
        .await
        .map_err(AppError::DownstreamRequest)?;

    Ok(Html(forecast_page(&forecast)))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            display: flex;
            justify-content: center;
            margin: 0;
            padding-top: 4rem;
            background: #f7fafc;
        }}
        .container {{
            background: white;
            padding: 2.5rem;
            border-radius: 1rem;
            box-shadow: 0 10px 30px rgba(0,0,0,0.1);
            max-width: 640px;
        }}
        h1 {{ color: #2d3748; }}
        table {{ border-collapse: collapse; width: 100%; margin-top: 1rem; }}
        th, td {{ border: 1px solid #e2e8f0; padding: 0.5rem 1rem; text-align: left; }}
        th {{ background: #edf2f7; }}
        .button {{
            display: inline-block;
            background: #667eea;
            color: white;
            padding: 0.75rem 2rem;
            border-radius: 0.5rem;
            text-decoration: none;
        }}
        .request-id {{
            font-family: 'Courier New', monospace;
            background: #edf2f7;
            padding: 0.25rem 0.5rem;
            border-radius: 0.25rem;
        }}
    </style>
</head>
<body>
    <div class="container">
        {body}
    </div>
</body>
</html>
"#
    )
}

fn forecast_page(forecast: &[Forecast]) -> String {
    let rows: String = forecast
        .iter()
        .map(|entry| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&entry.date),
                entry.temperature,
                escape_html(&entry.summary),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Weather Forecast</h1>
        <table>
            <tr><th>Date</th><th>Temperature (&deg;C)</th><th>Summary</th></tr>
            {rows}
        </table>
        <p><a href="/">Back</a></p>"#
    );

    page("Weather Forecast", &body)
}

/// Generic error page. Failure details stay in the log; the page only
/// carries the correlation id to find them with.
fn error_page(request_id: &str) -> String {
    let body = format!(
        r#"<h1>Something went wrong</h1>
        <p>The request could not be completed. Please try again.</p>
        <p>Request ID: <span class="request-id">{}</span></p>
        <p><a href="/">Back</a></p>"#,
        escape_html(request_id),
    );

    page("Error", &body)
}
