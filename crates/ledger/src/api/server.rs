use crate::api::routes::admin::admin_routes;
use crate::api::routes::balances::balances_routes;
use crate::api::routes::inference::inference_routes;
use crate::api::routes::models::models_routes;
use crate::api::routes::nodes::nodes_routes;
use crate::api::routes::policy::policy_routes;
use crate::api::routes::requests::requests_routes;
use crate::catalog::ModelCatalog;
use crate::inference::InferenceDispatcher;
use crate::store::LedgerContext;
use actix_web::middleware::{Compress, NormalizePath, TrailingSlash};
use actix_web::{middleware, web::Data, App, HttpServer};
use actix_web::{web, HttpResponse};
use alloy::primitives::Address;
use anyhow::Error;
use log::info;
use serde_json::json;
use shared::security::api_key_middleware::ApiKeyMiddleware;
use shared::security::auth_signature_middleware::ValidateSignature;
use std::sync::Arc;
use utoipa::OpenApi;

pub struct AppState {
    pub ledger: Arc<LedgerContext>,
    pub catalog: Arc<ModelCatalog>,
    pub dispatcher: Option<Arc<InferenceDispatcher>>,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Compute Ledger API"),
    paths(
        crate::api::routes::nodes::register_node,
        crate::api::routes::nodes::get_nodes,
        crate::api::routes::nodes::get_node,
        crate::api::routes::requests::create_request,
        crate::api::routes::requests::get_requests,
        crate::api::routes::requests::get_request,
        crate::api::routes::requests::submit_result,
        crate::api::routes::policy::get_policy,
        crate::api::routes::admin::set_node_active,
        crate::api::routes::admin::set_node_stake,
        crate::api::routes::admin::set_min_node_stake,
        crate::api::routes::admin::set_platform_fee_rate,
        crate::api::routes::models::get_models,
        crate::api::routes::models::get_model,
        crate::api::routes::inference::run_inference,
        crate::api::routes::inference::get_inference_history,
        crate::api::routes::balances::get_balance,
    ),
    components(schemas(
        shared::models::Node,
        shared::models::node::NodeRegistration,
        shared::models::InferenceRequest,
        shared::models::request::CreateRequestPayload,
        shared::models::request::SubmitResultPayload,
        shared::models::PolicyConfig,
        shared::models::policy::FeeSplit,
        shared::models::ModelInfo,
        crate::api::routes::admin::StakeUpdate,
        crate::api::routes::admin::FeeRateUpdate,
        crate::api::routes::inference::InferencePayload,
    )),
    tags(
        (name = "nodes", description = "Node registry"),
        (name = "requests", description = "Inference requests and settlement"),
        (name = "policy", description = "Fee and stake policy"),
        (name = "models", description = "Model catalog"),
        (name = "inference", description = "Inference dispatch and history"),
    )
)]
pub struct ApiDoc;

pub async fn start_server(
    host: &str,
    port: u16,
    app_state: AppState,
    admin_api_key: String,
    admin: Address,
) -> Result<(), Error> {
    info!("Starting server at http://{host}:{port}");
    let app_state = Data::new(app_state);
    let api_key_middleware = Arc::new(ApiKeyMiddleware::new(admin_api_key, admin));
    let validate_signatures = ValidateSignature::new();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(Compress::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .app_data(web::PayloadConfig::default().limit(2_097_152))
            .service(web::resource("/health").route(web::get().to(|| async {
                HttpResponse::Ok().json(json!({ "status": "ok" }))
            })))
            .service(
                web::resource("/api-docs/openapi.json")
                    .route(web::get().to(|| async { HttpResponse::Ok().json(ApiDoc::openapi()) })),
            )
            .service(nodes_routes().wrap(validate_signatures.clone()))
            .service(requests_routes().wrap(validate_signatures.clone()))
            .service(policy_routes())
            .service(models_routes())
            .service(inference_routes())
            .service(balances_routes())
            .service(admin_routes().wrap(api_key_middleware.clone()))
            .default_service(web::route().to(|| async {
                HttpResponse::NotFound().json(json!({
                    "success": false,
                    "error": "Resource not found"
                }))
            }))
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}
