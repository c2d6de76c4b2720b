use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};

use crate::config::{AdminSeed, Config};
use crate::entities::usuario::{self, Rol};
use crate::error::{AppError, AppResult};
use crate::utils::password::hash_password;

/// Build the connection pool. Connections are opened on first use, so a
/// database that is down at startup does not keep the server from binding.
pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.connect_lazy(true).sqlx_logging(false);

    Database::connect(options)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Sentinel round-trip; only logs the outcome
pub async fn check_connectivity(db: &DatabaseConnection) -> bool {
    match db.ping().await {
        Ok(()) => {
            tracing::info!("Database connection verified");
            true
        }
        Err(e) => {
            tracing::error!("Database is not reachable: {}", e);
            false
        }
    }
}

/// Create the configured admin account unless the cedula is already taken.
/// Returns whether an account was inserted.
pub async fn seed_admin(db: &DatabaseConnection, seed: &AdminSeed) -> AppResult<bool> {
    let existing = usuario::Entity::find_by_id(seed.cedula.clone()).one(db).await?;
    if existing.is_some() {
        tracing::debug!(cedula = %seed.cedula, "Admin account already present");
        return Ok(false);
    }

    let admin = usuario::ActiveModel {
        cedula: Set(seed.cedula.clone()),
        nombre: Set(seed.nombre.clone()),
        telefono: Set(seed.telefono.clone()),
        correo: Set(seed.correo.clone()),
        contrasena_hash: Set(hash_password(&seed.password)?),
        rol: Set(Rol::Administrador),
        fecha_registro: Set(Utc::now().into()),
    };

    admin.insert(db).await?;
    tracing::info!(cedula = %seed.cedula, "Admin account created");
    Ok(true)
}
