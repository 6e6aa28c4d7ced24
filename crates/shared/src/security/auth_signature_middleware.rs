use crate::security::caller::Caller;
use crate::security::request_signer::signing_message;
use actix_web::dev::Payload;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::{ErrorBadRequest, ErrorUnauthorized, PayloadError};
use actix_web::http::Method;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{Error, HttpMessage};
use alloy::primitives::{Address, Signature};
use futures_util::future::{self, LocalBoxFuture};
use futures_util::{Stream, StreamExt};
use log::{debug, warn};
use serde_json::json;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::pin::Pin;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

pub const ADDRESS_HEADER: &str = "x-address";
pub const SIGNATURE_HEADER: &str = "x-signature";

const MAX_BODY_SIZE: usize = 1024 * 1024 * 2;
const BODY_TIMEOUT_SECS: u64 = 20;
const REQUEST_EXPIRY_SECS: i64 = 300;
const MIN_NONCE_LENGTH: usize = 16;
const MAX_NONCE_LENGTH: usize = 64;

/// Verifies signed mutating requests and exposes the recovered signer as
/// [`Caller`]. `GET` requests pass through untouched.
///
/// A signed body must be a JSON object carrying a `nonce` and a unix
/// `timestamp`. The signature covers the path and the key-sorted body, so
/// neither can be altered, and each nonce is accepted once.
#[derive(Clone, Default)]
pub struct ValidateSignature {
    nonces: Arc<Mutex<HashMap<String, i64>>>,
}

impl ValidateSignature {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, B> Transform<S, ServiceRequest> for ValidateSignature
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ValidateSignatureMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ValidateSignatureMiddleware {
            service: Rc::new(service),
            nonces: self.nonces.clone(),
        }))
    }
}

pub struct ValidateSignatureMiddleware<S> {
    service: Rc<S>,
    nonces: Arc<Mutex<HashMap<String, i64>>>,
}

fn header(req: &ServiceRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
}

fn valid_nonce_format(nonce: &str) -> bool {
    (MIN_NONCE_LENGTH..=MAX_NONCE_LENGTH).contains(&nonce.len())
        && nonce.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Records `nonce` unless it was already seen inside the expiry window.
async fn claim_nonce(nonces: &Mutex<HashMap<String, i64>>, nonce: &str, now: i64) -> bool {
    let mut nonces = nonces.lock().await;
    nonces.retain(|_, seen_at| now - *seen_at <= REQUEST_EXPIRY_SECS);
    if nonces.contains_key(nonce) {
        return false;
    }
    nonces.insert(nonce.to_string(), now);
    true
}

impl<S, B> Service<ServiceRequest> for ValidateSignatureMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        if req.method() == Method::GET {
            return Box::pin(async move { service.call(req).await });
        }

        let nonces = self.nonces.clone();
        let path = req.path().to_string();
        let x_address = header(&req, ADDRESS_HEADER);
        let x_signature = header(&req, SIGNATURE_HEADER);

        Box::pin(async move {
            let (Some(address), Some(signature)) = (x_address, x_signature) else {
                return Err(ErrorUnauthorized(json!({
                    "error": "Missing signature or address",
                    "code": "MISSING_AUTH_HEADERS",
                    "required_headers": [SIGNATURE_HEADER, ADDRESS_HEADER]
                })));
            };

            let mut payload = req.take_payload();
            let body_read = async {
                let mut body = BytesMut::new();
                while let Some(chunk) = payload.next().await {
                    let chunk = chunk?;
                    if body.len() + chunk.len() > MAX_BODY_SIZE {
                        return Err(ErrorBadRequest(json!({
                            "error": "Request body too large",
                            "code": "BODY_TOO_LARGE",
                            "max_size": MAX_BODY_SIZE
                        })));
                    }
                    body.extend_from_slice(chunk.as_ref());
                }
                Ok::<_, Error>(body)
            };
            let Ok(body) = timeout(Duration::from_secs(BODY_TIMEOUT_SECS), body_read).await else {
                return Err(ErrorBadRequest(json!({
                    "error": "Request body read timeout",
                    "code": "BODY_READ_TIMEOUT",
                    "timeout_seconds": BODY_TIMEOUT_SECS
                })));
            };
            let body = body?;

            let payload_value: serde_json::Value = match serde_json::from_slice(&body) {
                Ok(value) => value,
                Err(e) => {
                    return Err(ErrorBadRequest(json!({
                        "error": "Invalid JSON payload",
                        "code": "INVALID_JSON",
                        "details": e.to_string()
                    })));
                }
            };
            let nonce = payload_value
                .get("nonce")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            let timestamp = payload_value.get("timestamp").and_then(|v| v.as_i64());
            let (Some(nonce), Some(timestamp)) = (nonce, timestamp) else {
                return Err(ErrorBadRequest(json!({
                    "error": "Signed body must carry a nonce and a timestamp",
                    "code": "MISSING_NONCE"
                })));
            };
            if !valid_nonce_format(&nonce) {
                return Err(ErrorBadRequest(json!({
                    "error": "Invalid nonce format",
                    "code": "INVALID_NONCE_FORMAT",
                    "message": format!("Nonce must be {MIN_NONCE_LENGTH}-{MAX_NONCE_LENGTH} alphanumeric characters")
                })));
            }

            let Ok(expected_address) = Address::from_str(&address) else {
                return Err(ErrorUnauthorized(json!({
                    "error": "Invalid address format",
                    "code": "INVALID_ADDRESS_FORMAT"
                })));
            };
            let Ok(parsed_signature) = Signature::from_str(signature.trim_start_matches("0x"))
            else {
                return Err(ErrorUnauthorized(json!({
                    "error": "Invalid signature format",
                    "code": "INVALID_SIGNATURE_FORMAT"
                })));
            };
            let msg = signing_message(&path, Some(&payload_value));
            let Ok(recovered_address) = parsed_signature.recover_address_from_msg(msg) else {
                return Err(ErrorUnauthorized(json!({
                    "error": "Failed to recover address from message",
                    "code": "ADDRESS_RECOVERY_FAILED"
                })));
            };
            if recovered_address != expected_address {
                debug!("Recovered address: {recovered_address:?}");
                debug!("Expected address: {expected_address:?}");
                return Err(ErrorUnauthorized(json!({
                    "error": "Invalid signature",
                    "code": "SIGNATURE_MISMATCH"
                })));
            }

            let now = chrono::Utc::now().timestamp();
            if (now - timestamp).abs() > REQUEST_EXPIRY_SECS {
                return Err(ErrorUnauthorized(json!({
                    "error": "Request expired",
                    "code": "REQUEST_EXPIRED",
                    "timestamp": timestamp,
                    "current_time": now,
                    "max_age_seconds": REQUEST_EXPIRY_SECS
                })));
            }
            if !claim_nonce(&nonces, &nonce, now).await {
                warn!("Replayed nonce from {recovered_address}");
                return Err(ErrorUnauthorized(json!({
                    "error": "Request replay detected",
                    "code": "NONCE_ALREADY_USED"
                })));
            }

            req.extensions_mut().insert(Caller(recovered_address));

            let stream =
                futures_util::stream::once(future::ok::<Bytes, PayloadError>(body.freeze()));
            let boxed_stream: Pin<Box<dyn Stream<Item = Result<Bytes, PayloadError>>>> =
                Box::pin(stream);
            req.set_payload(Payload::from(boxed_stream));

            service.call(req).await
        })
    }
}
