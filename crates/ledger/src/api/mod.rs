pub mod routes;
pub mod server;

use crate::error::{ErrorKind, LedgerError};
use actix_web::HttpResponse;
use alloy::primitives::Address;
use log::error;
use serde_json::json;
use std::str::FromStr;

/// Translate a ledger error into the transport outcome for its kind.
pub(crate) fn error_response(err: &LedgerError) -> HttpResponse {
    let kind = err.kind();
    let mut response = match kind {
        ErrorKind::Validation | ErrorKind::PolicyViolation => HttpResponse::BadRequest(),
        ErrorKind::NotFound => HttpResponse::NotFound(),
        ErrorKind::Authorization => HttpResponse::Forbidden(),
        ErrorKind::StateConflict => HttpResponse::Conflict(),
        ErrorKind::Funds => HttpResponse::PaymentRequired(),
        ErrorKind::Internal => {
            error!("Internal ledger fault: {err}");
            HttpResponse::InternalServerError()
        }
    };
    response.json(json!({
        "success": false,
        "error": err.to_string(),
        "kind": kind,
        "retryable": err.is_retryable(),
    }))
}

pub(crate) fn parse_address(raw: &str) -> Result<Address, HttpResponse> {
    Address::from_str(raw.trim()).map_err(|_| {
        HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": format!("Invalid address: {raw}")
        }))
    })
}
