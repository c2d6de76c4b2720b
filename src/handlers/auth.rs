use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use crate::entities::usuario::{self, Rol};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{required, AppJson};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub cedula: Option<String>,
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub contrasena: Option<String>,
    pub rol: Option<String>,
}

/// A registration that passed boundary validation
#[derive(Debug)]
pub struct NuevoUsuario {
    pub cedula: String,
    pub nombre: String,
    pub telefono: String,
    pub correo: String,
    pub contrasena: String,
    pub rol: Rol,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<NuevoUsuario> {
        let rol = match self.rol.as_deref().map(str::trim) {
            None | Some("") => Rol::Cliente,
            Some(value) => {
                Rol::parse(value).ok_or_else(|| AppError::BadRequest("Rol inválido".to_string()))?
            }
        };

        let correo = required(self.correo, "correo")?;
        if !correo.contains('@') {
            return Err(AppError::BadRequest("Correo inválido".to_string()));
        }

        // Passwords are taken verbatim, never trimmed
        let contrasena = self
            .contrasena
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::BadRequest("Falta el campo requerido: contrasena".to_string()))?;

        Ok(NuevoUsuario {
            cedula: required(self.cedula, "cedula")?,
            nombre: required(self.nombre, "nombre")?,
            telefono: required(self.telefono, "telefono")?,
            correo,
            contrasena,
            rol,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub cedula: Option<String>,
    pub contrasena: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsuarioInfo {
    pub cedula: String,
    pub nombre: String,
    pub telefono: String,
    pub correo: String,
    pub rol: Rol,
}

impl From<usuario::Model> for UsuarioInfo {
    fn from(u: usuario::Model) -> Self {
        Self {
            cedula: u.cedula,
            nombre: u.nombre,
            telefono: u.telefono,
            correo: u.correo,
            rol: u.rol,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub mensaje: String,
    pub usuario: UsuarioInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub mensaje: String,
    pub usuario: UsuarioInfo,
    pub token: String,
}

/// Register a new account (cliente unless another role is requested)
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let nuevo = payload.validate()?;
    let password_hash = hash_password(&nuevo.contrasena)?;

    let new_user = usuario::ActiveModel {
        cedula: Set(nuevo.cedula),
        nombre: Set(nuevo.nombre),
        telefono: Set(nuevo.telefono),
        correo: Set(nuevo.correo),
        contrasena_hash: Set(password_hash),
        rol: Set(nuevo.rol),
        fecha_registro: Set(Utc::now().into()),
    };

    // Duplicates are detected by the unique constraints, not a pre-check
    let user = new_user
        .insert(&state.db)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Cédula o correo ya registrados"))?;

    tracing::info!(cedula = %user.cedula, rol = ?user.rol, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            mensaje: "Usuario registrado".to_string(),
            usuario: user.into(),
        }),
    ))
}

/// Login with cedula and password
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let secret = state.config.jwt_secret()?;

    let (cedula, contrasena) = match (payload.cedula, payload.contrasena) {
        (Some(c), Some(p)) if !c.trim().is_empty() && !p.is_empty() => (c.trim().to_string(), p),
        _ => {
            return Err(AppError::BadRequest(
                "Cédula y contraseña requeridos".to_string(),
            ))
        }
    };

    let user = usuario::Entity::find_by_id(cedula.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            tracing::info!(cedula = %cedula, "Login for unknown cedula");
            AppError::Unauthorized("Cédula o contraseña incorrectas".to_string())
        })?;

    if !verify_password(&contrasena, &user.contrasena_hash)? {
        tracing::info!(cedula = %cedula, "Login with wrong password");
        return Err(AppError::Unauthorized(
            "Cédula o contraseña incorrectas".to_string(),
        ));
    }

    let token = create_token(
        &user.cedula,
        user.rol,
        secret,
        state.config.jwt_expiration_hours,
    )?;

    tracing::info!(cedula = %user.cedula, "Login successful");

    Ok(Json(LoginResponse {
        mensaje: "Login exitoso".to_string(),
        usuario: user.into(),
        token,
    }))
}
