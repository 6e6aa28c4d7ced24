use crate::security::caller::AdminCaller;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use alloy::primitives::Address;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use subtle::ConstantTimeEq;

/// Guards the admin scope with a bearer key. A request carrying the right key
/// acts as the configured admin identity, exposed to handlers as [`AdminCaller`].
pub struct ApiKeyMiddleware {
    api_key: String,
    admin: Address,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: String, admin: Address) -> Self {
        Self { api_key, admin }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService {
            service,
            api_key: self.api_key.clone(),
            admin: self.admin,
        }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: S,
    api_key: String,
    admin: Address,
}

impl<S> ApiKeyMiddlewareService<S> {
    fn bearer_matches(&self, req: &ServiceRequest) -> bool {
        let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
            return false;
        };
        let Ok(auth_str) = auth_header.to_str() else {
            return false;
        };
        if auth_str.len() <= 7 {
            return false;
        }
        let (scheme, key) = auth_str.split_at(7);
        if !scheme.eq_ignore_ascii_case("Bearer ") {
            return false;
        }

        let provided = key.as_bytes();
        let expected = self.api_key.as_bytes();
        provided.len() == expected.len() && provided.ct_eq(expected).into()
    }
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !self.bearer_matches(&req) {
            return Box::pin(async move { Err(ErrorUnauthorized("Invalid API key")) });
        }

        req.extensions_mut().insert(AdminCaller(self.admin));
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
