// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{User, UserRole},
};

/// Quem está chamando. Vai explícito para todos os serviços.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: UserRole,
    pub is_trainer: bool,
}

impl AuthenticatedUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// O próprio usuário, ou alguém da administração.
    pub fn can_act_for(&self, user_id: Uuid) -> bool {
        self.id == user_id || self.is_staff()
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() { Ok(()) } else { Err(AppError::Forbidden) }
    }

    pub fn require_self_or_staff(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.can_act_for(user_id) { Ok(()) } else { Err(AppError::Forbidden) }
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, role: user.role, is_trainer: user.is_trainer }
    }
}

// O middleware em si: valida o Bearer e pendura o usuário nos "extensions"
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: axum::extract::Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    request.extensions_mut().insert(AuthenticatedUser::from(&user));
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser { id: Uuid::new_v4(), role, is_trainer: false }
    }

    #[test]
    fn members_can_only_act_for_themselves() {
        let member = caller(UserRole::Member);
        assert!(member.can_act_for(member.id));
        assert!(!member.can_act_for(Uuid::new_v4()));
        assert!(matches!(member.require_staff(), Err(AppError::Forbidden)));
    }

    #[test]
    fn owners_and_admins_are_staff() {
        for role in [UserRole::Owner, UserRole::Admin] {
            let staff = caller(role);
            assert!(staff.can_act_for(Uuid::new_v4()));
            assert!(staff.require_staff().is_ok());
        }
    }
}
