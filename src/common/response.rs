// src/common/response.rs

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

/// Envelope de sucesso: `{ "status": "success", "message": ..., "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self { status: "success", message: message.into(), data }
    }
}

/// 200 com envelope. `code` é a chave da mensagem no I18nStore.
pub fn ok<T: Serialize>(store: &I18nStore, locale: &Locale, code: &str, data: T) -> impl IntoResponse + use<T> {
    (StatusCode::OK, Json(ApiResponse::new(store.translate(&locale.0, code), data)))
}

/// 201 com envelope
pub fn created<T: Serialize>(store: &I18nStore, locale: &Locale, code: &str, data: T) -> impl IntoResponse + use<T> {
    (StatusCode::CREATED, Json(ApiResponse::new(store.translate(&locale.0, code), data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_status_message_and_data() {
        let body = serde_json::to_value(ApiResponse::new("Criado", vec![1, 2])).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Criado");
        assert_eq!(body["data"], serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn created_uses_201_and_the_translated_message() {
        let response = created(&I18nStore::default(), &Locale("pt".into()), "membership_purchased", 1).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Matrícula comprada com sucesso.");
    }
}
