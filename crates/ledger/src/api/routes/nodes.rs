use crate::api::server::AppState;
use crate::api::{error_response, parse_address};
use crate::registry::NodeFilter;
use actix_web::{
    web::{self, get, post, Data, Json, Query},
    HttpResponse, Scope,
};
use log::info;
use serde::Deserialize;
use serde_json::json;
use shared::models::api::{ApiResponse, ListResponse};
use shared::models::node::NodeRegistration;
use shared::security::caller::Caller;

#[derive(Deserialize)]
struct NodeQuery {
    model: Option<String>,
    location: Option<String>,
    include_inactive: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/nodes",
    request_body = NodeRegistration,
    responses(
        (status = 201, description = "Node registered"),
        (status = 400, description = "Invalid registration or stake below minimum"),
        (status = 401, description = "Missing or invalid request signature"),
        (status = 409, description = "Identity already holds a node")
    ),
    tag = "nodes"
)]
pub(crate) async fn register_node(
    caller: Caller,
    registration: Json<NodeRegistration>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let registry = &app_state.ledger.registry;
    match registry
        .register_node(caller.0, registration.into_inner())
        .await
    {
        Ok(address) => match registry.get_node(address).await {
            Ok(node) => {
                info!("Registered node {node}");
                HttpResponse::Created().json(ApiResponse::ok(node))
            }
            Err(e) => error_response(&e),
        },
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/nodes",
    params(
        ("model" = Option<String>, Query, description = "Only nodes supporting this model"),
        ("location" = Option<String>, Query, description = "Case-insensitive part of the node location"),
        ("include_inactive" = Option<bool>, Query, description = "Include deactivated nodes")
    ),
    responses(
        (status = 200, description = "List of nodes")
    ),
    tag = "nodes"
)]
pub(crate) async fn get_nodes(query: Query<NodeQuery>, app_state: Data<AppState>) -> HttpResponse {
    let query = query.into_inner();
    let filter = NodeFilter {
        model: query.model,
        location: query.location,
        include_inactive: query.include_inactive.unwrap_or(false),
    };
    let nodes = app_state.ledger.registry.list_nodes(&filter).await;
    ListResponse::new(nodes).into()
}

#[utoipa::path(
    get,
    path = "/nodes/{address}",
    params(
        ("address" = String, Path, description = "Node address")
    ),
    responses(
        (status = 200, description = "Node details"),
        (status = 400, description = "Invalid address"),
        (status = 404, description = "Node not found")
    ),
    tag = "nodes"
)]
pub(crate) async fn get_node(address: web::Path<String>, app_state: Data<AppState>) -> HttpResponse {
    let address = match parse_address(&address) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match app_state.ledger.registry.get_node(address).await {
        Ok(node) => HttpResponse::Ok().json(json!({"success": true, "data": node})),
        Err(e) => error_response(&e),
    }
}

pub fn nodes_routes() -> Scope {
    web::scope("/nodes")
        .route("", post().to(register_node))
        .route("", get().to(get_nodes))
        .route("/{address}", get().to(get_node))
}
