use actix_web::{dev::Payload, error::ErrorUnauthorized};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use alloy::primitives::Address;
use futures_util::future::{ready, Ready};

/// Identity of the account issuing a request, as recovered from its signature
/// by [`super::auth_signature_middleware::ValidateSignature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Address);

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Caller>()
                .copied()
                .ok_or_else(|| ErrorUnauthorized("Signed request required")),
        )
    }
}

/// Admin identity, present only behind [`super::api_key_middleware::ApiKeyMiddleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCaller(pub Address);

impl FromRequest for AdminCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AdminCaller>()
                .copied()
                .ok_or_else(|| ErrorUnauthorized("Admin credentials required")),
        )
    }
}
