use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Query field the shim adds when a GET stands in for a POST.
pub const METHOD_MARKER_KEY: &str = "_rexxar_method";

/// Status a direct host answers with when the network is unreachable.
pub const NETWORK_FAILURE_STATUS: u16 = 999;

/// How the simulated container reports failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMode {
    /// Folds every failure into a 200 with an `_error_=` body.
    Android,
    /// Passes upstream statuses through; network failure is status 999.
    Direct,
}

impl FromStr for HostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(HostMode::Android),
            "direct" => Ok(HostMode::Direct),
            other => Err(format!("unknown host mode: {other}")),
        }
    }
}

/// What `/echo` saw, after undoing the POST fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub params: Vec<(String, String)>,
}

/// Outcome of the simulated upstream call, before the host rewrites it.
enum Upstream {
    Ok(Value),
    Failed { status: u16, payload: Value },
    Offline,
}

pub fn app(mode: HostMode) -> Router {
    Router::new()
        .route("/echo", get(echo))
        .route("/status/{code}", get(failing_status))
        .route("/offline", get(offline))
        .with_state(mode)
}

pub async fn run(listener: TcpListener, mode: HostMode) -> Result<(), std::io::Error> {
    axum::serve(listener, app(mode)).await
}

async fn echo(
    State(mode): State<HostMode>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let was_post = params
        .iter()
        .any(|(k, v)| k == METHOD_MARKER_KEY && v == "POST");
    let params = params
        .into_iter()
        .filter(|(k, _)| k != METHOD_MARKER_KEY)
        .collect();
    let echo = Echo {
        method: if was_post { "POST" } else { "GET" }.to_string(),
        params,
    };
    deliver(mode, Upstream::Ok(json!(echo)))
}

async fn failing_status(State(mode): State<HostMode>, Path(code): Path<u16>) -> Response {
    if !(400..=599).contains(&code) {
        return (StatusCode::BAD_REQUEST, "status must be 4xx or 5xx").into_response();
    }
    let payload = json!({ "error": format!("upstream {code}") });
    deliver(mode, Upstream::Failed { status: code, payload })
}

async fn offline(State(mode): State<HostMode>) -> Response {
    deliver(mode, Upstream::Offline)
}

/// Apply the host's rewriting rules to an upstream outcome.
fn deliver(mode: HostMode, upstream: Upstream) -> Response {
    match (mode, upstream) {
        (_, Upstream::Ok(body)) => Json(body).into_response(),
        (HostMode::Android, Upstream::Failed { status, payload }) => {
            rewritten(json!({ "_response_error": payload, "_response_code": status }))
        }
        (HostMode::Android, Upstream::Offline) => rewritten(json!({ "_network_error": true })),
        (HostMode::Direct, Upstream::Failed { status, payload }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(payload)).into_response()
        }
        (HostMode::Direct, Upstream::Offline) => {
            let status =
                StatusCode::from_u16(NETWORK_FAILURE_STATUS).unwrap_or(StatusCode::BAD_GATEWAY);
            status.into_response()
        }
    }
}

fn rewritten(envelope: Value) -> Response {
    (StatusCode::OK, format!("_error_={envelope}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_mode_parses_case_insensitively() {
        assert_eq!("Android".parse::<HostMode>().unwrap(), HostMode::Android);
        assert_eq!("DIRECT".parse::<HostMode>().unwrap(), HostMode::Direct);
        assert!("ios".parse::<HostMode>().is_err());
    }

    #[test]
    fn echo_serializes_params_as_pairs() {
        let echo = Echo {
            method: "POST".to_string(),
            params: vec![("k".to_string(), "v".to_string())],
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["params"][0][0], "k");
        assert_eq!(json["params"][0][1], "v");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "GET".to_string(),
            params: Vec::new(),
        };
        let back: Echo = serde_json::from_str(&serde_json::to_string(&echo).unwrap()).unwrap();
        assert_eq!(back, echo);
    }

    #[test]
    fn sentinel_status_is_representable() {
        assert_eq!(
            StatusCode::from_u16(NETWORK_FAILURE_STATUS).unwrap().as_u16(),
            999
        );
    }
}
