use crate::error::{LedgerError, LedgerResult};
use shared::models::catalog::InputType;
use shared::models::ModelInfo;

#[derive(Debug, Clone, Default)]
pub struct ModelQuery {
    pub input_type: Option<InputType>,
    pub search: Option<String>,
}

/// Descriptive model listing served to clients. Never consulted when deciding
/// whether a node may serve a model.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    pub fn list_models(&self, query: &ModelQuery) -> Vec<ModelInfo> {
        self.models
            .iter()
            .filter(|model| query.input_type.map_or(true, |t| model.input_type == t))
            .filter(|model| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |term| model.matches_search(term))
            })
            .cloned()
            .collect()
    }

    pub fn get_model(&self, id: &str) -> LedgerResult<ModelInfo> {
        self.models
            .iter()
            .find(|model| model.id == id)
            .cloned()
            .ok_or_else(|| LedgerError::ModelNotFound(id.to_string()))
    }
}
