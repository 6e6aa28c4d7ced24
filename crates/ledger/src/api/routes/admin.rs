use crate::api::server::AppState;
use crate::api::{error_response, parse_address};
use actix_web::{
    web::{self, post, put, Data, Json},
    HttpResponse, Scope,
};
use alloy::primitives::U256;
use log::info;
use serde::Deserialize;
use shared::models::api::ApiResponse;
use shared::security::caller::AdminCaller;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StakeUpdate {
    #[serde(with = "shared::models::amount")]
    #[schema(value_type = String, example = "1000")]
    pub stake: U256,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeeRateUpdate {
    pub rate_bps: u16,
}

#[utoipa::path(
    post,
    path = "/admin/nodes/{address}/{action}",
    params(
        ("address" = String, Path, description = "Node address"),
        ("action" = String, Path, description = "`activate` or `deactivate`")
    ),
    responses(
        (status = 200, description = "Node status updated"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Node not found")
    ),
    security(("api_key" = [])),
    tag = "admin"
)]
pub(crate) async fn set_node_active(
    admin: AdminCaller,
    path: web::Path<(String, String)>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let (address, action) = path.into_inner();
    let active = match action.as_str() {
        "activate" => true,
        "deactivate" => false,
        _ => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "success": false,
                "error": format!("Unknown node action: {action}")
            }))
        }
    };
    let address = match parse_address(&address) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match app_state
        .ledger
        .registry
        .set_node_active(admin.0, address, active)
        .await
    {
        Ok(node) => {
            info!("Node {address} {action}d");
            ApiResponse::ok(node).into()
        }
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/admin/nodes/{address}/stake",
    params(
        ("address" = String, Path, description = "Node address")
    ),
    request_body = StakeUpdate,
    responses(
        (status = 200, description = "Stake updated"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Node not found")
    ),
    security(("api_key" = [])),
    tag = "admin"
)]
pub(crate) async fn set_node_stake(
    admin: AdminCaller,
    address: web::Path<String>,
    update: Json<StakeUpdate>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let address = match parse_address(&address) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match app_state
        .ledger
        .registry
        .set_node_stake(admin.0, address, update.stake)
        .await
    {
        Ok(node) => {
            info!("Stake of node {address} set to {}", node.stake);
            ApiResponse::ok(node).into()
        }
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/admin/policy/min-stake",
    request_body = StakeUpdate,
    responses(
        (status = 200, description = "Minimum stake updated"),
        (status = 401, description = "Missing or invalid API key")
    ),
    security(("api_key" = [])),
    tag = "admin"
)]
pub(crate) async fn set_min_node_stake(
    admin: AdminCaller,
    update: Json<StakeUpdate>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let policy = &app_state.ledger.policy;
    match policy.set_min_node_stake(admin.0, update.stake).await {
        Ok(()) => {
            info!("Minimum node stake set to {}", update.stake);
            ApiResponse::ok(policy.current().await).into()
        }
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/admin/policy/fee-rate",
    request_body = FeeRateUpdate,
    responses(
        (status = 200, description = "Platform fee rate updated"),
        (status = 400, description = "Rate above 3000 bps"),
        (status = 401, description = "Missing or invalid API key")
    ),
    security(("api_key" = [])),
    tag = "admin"
)]
pub(crate) async fn set_platform_fee_rate(
    admin: AdminCaller,
    update: Json<FeeRateUpdate>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let policy = &app_state.ledger.policy;
    match policy.set_platform_fee_rate(admin.0, update.rate_bps).await {
        Ok(()) => {
            info!("Platform fee rate set to {} bps", update.rate_bps);
            ApiResponse::ok(policy.current().await).into()
        }
        Err(e) => error_response(&e),
    }
}

pub fn admin_routes() -> Scope {
    web::scope("/admin")
        .route("/nodes/{address}/stake", put().to(set_node_stake))
        .route("/nodes/{address}/{action}", post().to(set_node_active))
        .route("/policy/min-stake", put().to(set_min_node_stake))
        .route("/policy/fee-rate", put().to(set_platform_fee_rate))
}
