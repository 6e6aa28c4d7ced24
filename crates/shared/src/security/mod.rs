pub mod api_key_middleware;
pub mod auth_signature_middleware;
pub mod caller;
pub mod request_signer;
