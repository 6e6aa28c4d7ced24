use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(success: bool, data: T) -> Self {
        ApiResponse { success, data }
    }

    pub fn ok(data: T) -> Self {
        Self::new(true, data)
    }
}

impl<T: Serialize> From<ApiResponse<T>> for HttpResponse {
    fn from(response: ApiResponse<T>) -> Self {
        HttpResponse::Ok().json(response)
    }
}

/// Listing envelope used by the collection endpoints.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListResponse<T: Serialize> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

impl<T: Serialize> From<ListResponse<T>> for HttpResponse {
    fn from(response: ListResponse<T>) -> Self {
        HttpResponse::Ok().json(response)
    }
}
