use crate::api::server::AppState;
use crate::api::{error_response, parse_address};
use crate::requests::RequestFilter;
use actix_web::{
    web::{self, get, post, Data, Json, Query},
    HttpResponse, Scope,
};
use log::info;
use serde::Deserialize;
use serde_json::json;
use shared::models::api::{ApiResponse, ListResponse};
use shared::models::request::{CreateRequestPayload, SubmitResultPayload};
use shared::security::caller::Caller;
use uuid::Uuid;

#[derive(Deserialize)]
struct RequestQuery {
    requester: Option<String>,
    node: Option<String>,
    completed: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Request created and fee escrowed"),
        (status = 400, description = "Model not supported by node"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 402, description = "Requester cannot cover the fee"),
        (status = 404, description = "Node not found or inactive")
    ),
    tag = "requests"
)]
pub(crate) async fn create_request(
    caller: Caller,
    payload: Json<CreateRequestPayload>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let payload = payload.into_inner();
    match app_state
        .ledger
        .requests
        .create_request(caller.0, payload.node, &payload.model_id, payload.fee)
        .await
    {
        Ok(id) => {
            info!(
                "Request {id} created by {} for node {} ({})",
                caller.0, payload.node, payload.model_id
            );
            HttpResponse::Created().json(json!({"success": true, "data": {"id": id}}))
        }
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/requests",
    params(
        ("requester" = Option<String>, Query, description = "Filter by requester address"),
        ("node" = Option<String>, Query, description = "Filter by assigned node address"),
        ("completed" = Option<bool>, Query, description = "Filter by completion state")
    ),
    responses(
        (status = 200, description = "Requests, newest first"),
        (status = 400, description = "Invalid address filter")
    ),
    tag = "requests"
)]
pub(crate) async fn get_requests(
    query: Query<RequestQuery>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let query = query.into_inner();
    let requester = match query.requester.as_deref().map(parse_address).transpose() {
        Ok(requester) => requester,
        Err(response) => return response,
    };
    let node = match query.node.as_deref().map(parse_address).transpose() {
        Ok(node) => node,
        Err(response) => return response,
    };
    let filter = RequestFilter {
        requester,
        node,
        completed: query.completed,
    };
    let requests = app_state.ledger.requests.list_requests(&filter).await;
    ListResponse::new(requests).into()
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    params(
        ("id" = String, Path, description = "Request id")
    ),
    responses(
        (status = 200, description = "Request details"),
        (status = 404, description = "Request not found")
    ),
    tag = "requests"
)]
pub(crate) async fn get_request(id: web::Path<Uuid>, app_state: Data<AppState>) -> HttpResponse {
    match app_state.ledger.requests.get_request(id.into_inner()).await {
        Ok(request) => ApiResponse::ok(request).into(),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/requests/{id}/result",
    params(
        ("id" = String, Path, description = "Request id")
    ),
    request_body = SubmitResultPayload,
    responses(
        (status = 200, description = "Result stored and escrow released"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 403, description = "Caller is not the assigned node"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already completed"),
        (status = 402, description = "Payout rejected, request left pending")
    ),
    tag = "requests"
)]
pub(crate) async fn submit_result(
    caller: Caller,
    id: web::Path<Uuid>,
    payload: Json<SubmitResultPayload>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let id = id.into_inner();
    match app_state
        .ledger
        .settlement
        .submit_result(caller.0, id, payload.into_inner().result)
        .await
    {
        Ok(split) => {
            info!(
                "Request {id} settled: node {} paid {}, platform fee {}",
                caller.0, split.node_payment, split.platform_fee
            );
            ApiResponse::ok(split).into()
        }
        Err(e) => error_response(&e),
    }
}

pub fn requests_routes() -> Scope {
    web::scope("/requests")
        .route("", post().to(create_request))
        .route("", get().to(get_requests))
        .route("/{id}", get().to(get_request))
        .route("/{id}/result", post().to(submit_result))
}
