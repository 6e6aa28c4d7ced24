use crate::api::server::AppState;
use crate::api::{error_response, parse_address};
use crate::error::LedgerError;
use actix_web::{
    web::{self, get, Data},
    HttpResponse, Scope,
};
use serde_json::json;
use shared::balance::BalanceHolder;

#[utoipa::path(
    get,
    path = "/balances/{address}",
    params(
        ("address" = String, Path, description = "Account address")
    ),
    responses(
        (status = 200, description = "Spendable balance"),
        (status = 400, description = "Invalid address")
    ),
    tag = "balances"
)]
pub(crate) async fn get_balance(
    address: web::Path<String>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let address = match parse_address(&address) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match app_state.ledger.balances.balance_of(address).await {
        Ok(balance) => HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "address": address,
                "balance": balance.to_string()
            }
        })),
        Err(e) => error_response(&LedgerError::Internal(e.to_string())),
    }
}

pub fn balances_routes() -> Scope {
    web::scope("/balances").route("/{address}", get().to(get_balance))
}
