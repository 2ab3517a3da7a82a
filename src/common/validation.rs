// src/common/validation.rs

use std::collections::HashMap;

use crate::common::error::AppError;

/// Acumulador de erros de campo para as regras que olham a entidade inteira.
/// Junta tudo e devolve de uma vez, igual ao validador de custom_data.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarda só o primeiro erro de cada campo.
    pub fn add(&mut self, field: &str, code: &str) {
        self.0.entry(field.to_string()).or_insert_with(|| code.to_string());
    }

    pub fn check(&mut self, condition: bool, field: &str, code: &str) {
        if !condition {
            self.add(field, code);
        }
    }

    /// Junta os erros de campo de outra regra. Qualquer outro erro sobe direto.
    pub fn absorb(&mut self, result: Result<(), AppError>) -> Result<(), AppError> {
        match result {
            Ok(()) => Ok(()),
            Err(AppError::FieldValidation(fields)) => {
                for (field, code) in fields {
                    self.add(&field, &code);
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::FieldValidation(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_error_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("fee_amount", "invalid_fee");
        errors.add("fee_amount", "required");
        errors.check(true, "duration_minutes", "invalid_duration");

        match errors.into_result() {
            Err(AppError::FieldValidation(map)) => {
                assert_eq!(map.len(), 1);
                assert_eq!(map["fee_amount"], "invalid_fee");
            }
            other => panic!("esperava FieldValidation, veio {:?}", other),
        }
    }

    #[test]
    fn absorb_merges_field_errors_and_passes_others_through() {
        let mut errors = FieldErrors::new();
        errors.add("membership_id", "membership_inactive");

        let merged = errors.absorb(Err(AppError::field("session_date", "past_session_date")));
        assert!(merged.is_ok());
        assert!(errors.absorb(Err(AppError::Forbidden)).is_err());

        match errors.into_result() {
            Err(AppError::FieldValidation(map)) => assert_eq!(map.len(), 2),
            other => panic!("esperava FieldValidation, veio {:?}", other),
        }
    }

    #[test]
    fn empty_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
