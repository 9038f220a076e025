use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /convert-url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConvertUrlRequest {
    /// Remote location of the PDF to download and convert.
    #[serde(default)]
    pub url: Option<String>,
}

/// Multipart form accepted by `POST /convert`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ConvertUpload {
    /// The PDF document.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
