use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::ServerError;

/// Turn a handler panic into the usual `{"error": ...}` 500 response.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unexpected panic".to_owned()
    };
    ServerError::Internal(detail).into_response()
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn string_payload_becomes_500() {
        let response = panic_response(Box::new(String::from("boom")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn opaque_payload_becomes_500() {
        let response = panic_response(Box::new(42_u32));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
