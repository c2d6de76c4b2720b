use std::env;

use thiserror::Error;

use crate::error::{AppError, AppResult};

const DEFAULT_BODY_LIMIT: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Account created at startup when `ADMIN_CEDULA` and `ADMIN_PASSWORD` are set
#[derive(Clone)]
pub struct AdminSeed {
    pub cedula: String,
    pub nombre: String,
    pub telefono: String,
    pub correo: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Left unset, token endpoints answer with a configuration error
    pub jwt_secret: Option<String>,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub body_limit_bytes: usize,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_expiration_hours = match non_empty("JWT_EXPIRATION_HOURS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "JWT_EXPIRATION_HOURS",
                value,
            })?,
            None => 8,
        };

        let server_port = match non_empty("SERVER_PORT").or_else(|| non_empty("PORT")) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                value,
            })?,
            None => 3000,
        };

        let body_limit_bytes = match non_empty("BODY_LIMIT_BYTES") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "BODY_LIMIT_BYTES",
                value,
            })?,
            None => DEFAULT_BODY_LIMIT,
        };

        let admin_seed = match (non_empty("ADMIN_CEDULA"), non_empty("ADMIN_PASSWORD")) {
            (Some(cedula), Some(password)) => Some(AdminSeed {
                nombre: non_empty("ADMIN_NOMBRE").unwrap_or_else(|| "Administrador".to_string()),
                telefono: non_empty("ADMIN_TELEFONO").unwrap_or_else(|| "00000000".to_string()),
                correo: non_empty("ADMIN_CORREO")
                    .unwrap_or_else(|| format!("{}@taller.local", cedula)),
                cedula,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret: non_empty("JWT_SECRET"),
            jwt_expiration_hours,
            server_host: non_empty("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            body_limit_bytes,
            admin_seed,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn jwt_secret(&self) -> AppResult<&str> {
        self.jwt_secret.as_deref().ok_or_else(|| {
            AppError::Config(
                "Error de configuración del servidor (JWT_SECRET no definida).".to_string(),
            )
        })
    }
}
