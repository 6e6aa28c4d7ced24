use crate::api::error_response;
use crate::api::server::AppState;
use crate::catalog::ModelQuery;
use actix_web::{
    web::{self, get, Data, Query},
    HttpResponse, Scope,
};
use serde::Deserialize;
use shared::models::api::{ApiResponse, ListResponse};
use shared::models::catalog::InputType;
use shared::models::ModelInfo;

#[derive(Deserialize)]
struct ModelListQuery {
    input_type: Option<InputType>,
    search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/models",
    params(
        ("input_type" = Option<String>, Query, description = "`text` or `image`"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on name and description")
    ),
    responses(
        (status = 200, description = "Catalog entries")
    ),
    tag = "models"
)]
pub(crate) async fn get_models(
    query: Query<ModelListQuery>,
    app_state: Data<AppState>,
) -> HttpResponse {
    let query = query.into_inner();
    let query = ModelQuery {
        input_type: query.input_type,
        search: query.search.filter(|term| !term.trim().is_empty()),
    };
    ListResponse::new(app_state.catalog.list_models(&query)).into()
}

#[utoipa::path(
    get,
    path = "/models/{id}",
    params(
        ("id" = String, Path, description = "Model id")
    ),
    responses(
        (status = 200, description = "Catalog entry", body = ModelInfo),
        (status = 404, description = "Model not found")
    ),
    tag = "models"
)]
pub(crate) async fn get_model(id: web::Path<String>, app_state: Data<AppState>) -> HttpResponse {
    match app_state.catalog.get_model(&id) {
        Ok(model) => ApiResponse::ok(model).into(),
        Err(e) => error_response(&e),
    }
}

pub fn models_routes() -> Scope {
    web::scope("/models")
        .route("", get().to(get_models))
        .route("/{id}", get().to(get_model))
}
