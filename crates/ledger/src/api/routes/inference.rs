use crate::api::server::AppState;
use crate::api::{error_response, parse_address};
use actix_web::{
    web::{self, get, post, Data, Json, Query},
    HttpResponse, Scope,
};
use alloy::primitives::Address;
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use shared::models::api::{ApiResponse, ListResponse};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct InferencePayload {
    pub model_id: String,
    #[schema(value_type = String)]
    pub node: Address,
    pub prompt: String,
}

#[derive(Deserialize)]
struct HistoryQuery {
    node: Option<String>,
}

fn no_dispatcher() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({
        "success": false,
        "error": "No inference service configured"
    }))
}

#[utoipa::path(
    post,
    path = "/inference",
    request_body = InferencePayload,
    responses(
        (status = 200, description = "Inference output with measured latency"),
        (status = 400, description = "Missing input or model not supported by node"),
        (status = 404, description = "Node or model not found"),
        (status = 503, description = "No inference service configured")
    ),
    tag = "inference"
)]
pub(crate) async fn run_inference(
    payload: Json<InferencePayload>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let Some(dispatcher) = app_state.dispatcher.as_ref() else {
        return no_dispatcher();
    };

    let payload = payload.into_inner();
    match dispatcher
        .run(&payload.model_id, payload.node, &payload.prompt)
        .await
    {
        Ok(record) => {
            info!(
                "Inference on node {} for {} took {}ms",
                record.node, record.model_id, record.latency_ms
            );
            ApiResponse::ok(record).into()
        }
        Err(e) => {
            warn!("Inference for {} failed: {e}", payload.model_id);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/inference/history",
    params(
        ("node" = Option<String>, Query, description = "Only inferences served by this node")
    ),
    responses(
        (status = 200, description = "Completed inferences, newest first"),
        (status = 400, description = "Invalid node address"),
        (status = 503, description = "No inference service configured")
    ),
    tag = "inference"
)]
pub(crate) async fn get_inference_history(
    query: Query<HistoryQuery>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let Some(dispatcher) = app_state.dispatcher.as_ref() else {
        return no_dispatcher();
    };
    let node = match query.node.as_deref().map(parse_address).transpose() {
        Ok(node) => node,
        Err(response) => return response,
    };
    ListResponse::new(dispatcher.history(node).await).into()
}

pub fn inference_routes() -> Scope {
    web::scope("/inference")
        .route("", post().to(run_inference))
        .route("/history", get().to(get_inference_history))
}
