use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Extract and validate the bearer token, then attach its claims
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Token requerido".to_string()))?;

    let secret = state.config.jwt_secret()?;
    let claims = verify_token(auth.token(), secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Require admin role
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?;

    if !claims.is_admin() {
        tracing::warn!(cedula = %claims.cedula, uri = %request.uri(), "Admin route denied");
        return Err(AppError::Forbidden("No autorizado".to_string()));
    }

    Ok(next.run(request).await)
}

/// Owner-or-admin rule shared by every ownership-scoped handler
pub fn ensure_owner_or_admin(claims: &Claims, propietario_cedula: &str) -> AppResult<()> {
    if claims.can_access(propietario_cedula) {
        Ok(())
    } else {
        tracing::warn!(
            cedula = %claims.cedula,
            propietario = %propietario_cedula,
            "Client attempted to access a record they do not own"
        );
        Err(AppError::Forbidden("No autorizado".to_string()))
    }
}
