use crate::api::server::AppState;
use actix_web::{
    web::{self, get, Data},
    HttpResponse, Scope,
};
use shared::models::api::ApiResponse;
use shared::models::PolicyConfig;

#[utoipa::path(
    get,
    path = "/policy",
    responses(
        (status = 200, description = "Current minimum stake and platform fee rate", body = PolicyConfig)
    ),
    tag = "policy"
)]
pub(crate) async fn get_policy(app_state: Data<AppState>) -> HttpResponse {
    ApiResponse::ok(app_state.ledger.policy.current().await).into()
}

pub fn policy_routes() -> Scope {
    web::scope("/policy").route("", get().to(get_policy))
}
