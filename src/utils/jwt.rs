use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::entities::usuario::Rol;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub cedula: String,
    pub rol: Rol,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.rol == Rol::Administrador
    }

    /// Administrators see everything, clients only what they own
    pub fn can_access(&self, propietario_cedula: &str) -> bool {
        self.is_admin() || self.cedula == propietario_cedula
    }
}

pub fn create_token(
    cedula: &str,
    rol: Rol,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        cedula: cedula.to_string(),
        rol,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

/// A token that is present but fails verification is `Forbidden`, not
/// `Unauthorized`: the caller did authenticate, just not validly.
pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AppError::Forbidden("Token inválido".to_string())
    })
}
