//! Warp filters for the HTTP API

use crate::error::{handle_rejection, ApiError};
use crate::state::{decode_advisory, AppState, InsightsBody};
use lca_advisory::{InsightsResponse, SuggestionsResponse, TipsRequest};
use lca_core::ProjectId;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use warp::reply::Response;
use warp::{Filter, Reply};

/// Request bodies above this size are rejected
const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Serialize)]
struct DataEnvelope<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct SuccessEnvelope {
    success: bool,
}

fn ok_data<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(data) => warp::reply::json(&DataEnvelope {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

fn ok_json<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => e.into_response(),
    }
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&state))
}

fn json_body() -> impl Filter<Extract = (serde_json::Value,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Every route, with rejection handling
///
/// The binary adds `warp::trace::request()` on top.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
    let health = warp::path!("healthz")
        .and(warp::get())
        .map(|| "ok".into_response());

    health
        .or(results(Arc::clone(&state)))
        .unify()
        .or(wizard(Arc::clone(&state)))
        .unify()
        .or(advisory(state))
        .unify()
        .recover(handle_rejection)
        .unify()
}

fn results(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let analyze = warp::path!("api" / "lca" / "analyze")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .map(|state: Arc<AppState>, body: serde_json::Value| ok_data(state.analyze(body)));

    let latest = warp::path!("api" / "lca" / "results" / "latest")
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .map(|state: Arc<AppState>| ok_data(state.latest()));

    let by_id = warp::path!("api" / "lca" / "results" / ProjectId)
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .map(|id: ProjectId, state: Arc<AppState>| ok_data(state.result(&id)));

    let export = warp::path!("api" / "lca" / "results" / ProjectId / "export" / String)
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .map(|id: ProjectId, format: String, state: Arc<AppState>| {
            match state.export(&id, &format) {
                Ok(export) => {
                    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
                    let reply = warp::reply::with_header(export.body, CONTENT_TYPE, export.mime_type);
                    warp::reply::with_header(reply, CONTENT_DISPOSITION, disposition).into_response()
                }
                Err(e) => e.into_response(),
            }
        });

    let clear = warp::path!("api" / "lca" / "results")
        .and(warp::delete())
        .and(with_state(state))
        .map(|state: Arc<AppState>| ok_json(state.clear().map(|()| SuccessEnvelope { success: true })));

    analyze
        .or(latest)
        .unify()
        .or(export)
        .unify()
        .or(by_id)
        .unify()
        .or(clear)
        .unify()
}

fn wizard(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let show = warp::path!("api" / "wizard")
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .map(|state: Arc<AppState>| ok_data(Ok(state.wizard())));

    let update = warp::path!("api" / "wizard")
        .and(warp::patch())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .map(|state: Arc<AppState>, body: serde_json::Value| ok_data(state.update_wizard(body)));

    let next = warp::path!("api" / "wizard" / "next")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .map(|state: Arc<AppState>| ok_data(Ok(state.next_step())));

    let prev = warp::path!("api" / "wizard" / "prev")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .map(|state: Arc<AppState>| ok_data(Ok(state.prev_step())));

    let reset = warp::path!("api" / "wizard" / "reset")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .map(|state: Arc<AppState>| ok_data(state.reset_wizard()));

    let submit = warp::path!("api" / "wizard" / "submit")
        .and(warp::post())
        .and(with_state(state))
        .map(|state: Arc<AppState>| ok_data(state.submit_wizard()));

    show.or(update)
        .unify()
        .or(next)
        .unify()
        .or(prev)
        .unify()
        .or(reset)
        .unify()
        .or(submit)
        .unify()
}

fn advisory(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let insights = warp::path!("api" / "ai" / "insights")
        .and(warp::post())
        .and(with_state(Arc::clone(&state)))
        .and(json_body())
        .then(|state: Arc<AppState>, body: serde_json::Value| async move {
            match decode_advisory::<InsightsBody>(body) {
                Ok(body) => ok_json(state.insights(body).await.map(InsightsResponse::from)),
                Err(e) => e.into_response(),
            }
        });

    let suggestions = warp::path!("api" / "ai" / "suggestions")
        .and(warp::post())
        .and(with_state(state))
        .and(json_body())
        .then(|state: Arc<AppState>, body: serde_json::Value| async move {
            match decode_advisory::<TipsRequest>(body) {
                Ok(request) => ok_json(state.suggestions(request).await.map(SuggestionsResponse::from)),
                Err(e) => e.into_response(),
            }
        });

    insights.or(suggestions).unify()
}
