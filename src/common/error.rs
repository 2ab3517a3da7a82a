// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// As mensagens aqui são só para log; o texto que vai para o cliente
// sai do I18nStore (ver `to_api_error`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regras de negócio que olham a entidade inteira (campo -> código)
    #[error("Erro de validação de campos: {0:?}")]
    FieldValidation(HashMap<String, String>),

    // Transição de estado inválida. O registro fica intacto.
    #[error("Conflito de estado: {0}")]
    StateConflict(&'static str),

    #[error("Acesso negado")]
    Forbidden,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// A resposta de erro que efetivamente sai pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl AppError {
    /// Helper para erros de um único campo.
    pub fn field(field: &str, code: &str) -> Self {
        let mut map = HashMap::new();
        map.insert(field.to_string(), code.to_string());
        AppError::FieldValidation(map)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::FieldValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::StateConflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave de tradução da mensagem principal
    fn message_key(&self) -> String {
        match self {
            AppError::ValidationError(_) | AppError::FieldValidation(_) => "validation_failed".into(),
            AppError::StateConflict(code) => (*code).to_string(),
            AppError::Forbidden => "forbidden".into(),
            AppError::NotFound(entity) => format!("{}_not_found", entity),
            AppError::EmailAlreadyExists => "email_already_exists".into(),
            AppError::InvalidCredentials => "invalid_credentials".into(),
            AppError::InvalidToken => "invalid_token".into(),
            AppError::UserNotFound => "user_not_found".into(),
            AppError::UniqueConstraintViolation(code) => code.clone(),
            _ => "internal_error".into(),
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada; o cliente só vê a genérica.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let errors = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string());
                            store.translate(&locale.0, &code)
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(details)
            }
            AppError::FieldValidation(fields) => Some(
                fields
                    .iter()
                    .map(|(field, code)| (field.clone(), vec![store.translate(&locale.0, code)]))
                    .collect(),
            ),
            _ => None,
        };

        ApiError {
            status,
            message: store.translate(&locale.0, &self.message_key()),
            errors,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "status": "error",
            "message": self.message,
        });
        if let Some(errors) = self.errors {
            body["errors"] = json!(errors);
        }
        (self.status, Json(body)).into_response()
    }
}

// Usado pelos extratores/middlewares, que não têm acesso ao Locale.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::default()).into_response()
    }
}

/// Converte violações de unicidade do Postgres no erro de domínio certo,
/// olhando o nome da constraint.
pub fn map_unique_violation(e: sqlx::Error, constraint_to_error: &[(&str, &str)]) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            for (name, code) in constraint_to_error {
                if constraint == *name {
                    return AppError::UniqueConstraintViolation((*code).to_string());
                }
            }
            tracing::warn!("Violação de unicidade sem mapeamento: {}", constraint);
            return AppError::UniqueConstraintViolation("already_exists".to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conflicts_are_409_and_keep_their_code() {
        let err = AppError::StateConflict("session_not_completable");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let api = err.to_api_error(&Locale("en".into()), &I18nStore::default());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.errors.is_none());
    }

    #[test]
    fn field_validation_carries_translated_field_errors() {
        let err = AppError::field("trainee_membership_id", "sport_mismatch");
        let api = err.to_api_error(&Locale("pt".into()), &I18nStore::default());

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        let errors = api.errors.expect("deve ter erros de campo");
        let messages = &errors["trainee_membership_id"];
        assert_eq!(messages.len(), 1);
        assert_ne!(messages[0], "sport_mismatch");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão caiu"));
        let api = err.to_api_error(&Locale("en".into()), &I18nStore::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("conexão"));
    }
}
