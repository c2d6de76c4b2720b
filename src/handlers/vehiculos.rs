use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::entities::{usuario, vehiculo};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ensure_owner_or_admin;
use crate::utils::jwt::Claims;
use crate::utils::validation::{required, AppJson};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVehiculoRequest {
    pub placa: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    /// Only honoured for administrators
    pub propietario_cedula: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehiculoRequest {
    pub marca: Option<String>,
    pub modelo: Option<String>,
}

/// List vehicles: all for admins, own for clients, newest first
pub async fn list_vehiculos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<vehiculo::Model>>> {
    let mut query = vehiculo::Entity::find().order_by_desc(vehiculo::Column::FechaRegistro);

    if !claims.is_admin() {
        query = query.filter(vehiculo::Column::PropietarioCedula.eq(&claims.cedula));
    }

    let vehiculos = query.all(&state.db).await?;
    tracing::debug!(cedula = %claims.cedula, count = vehiculos.len(), "Vehicles listed");

    Ok(Json(vehiculos))
}

/// Register a vehicle. Clients always own what they create.
pub async fn create_vehiculo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateVehiculoRequest>,
) -> AppResult<(StatusCode, Json<vehiculo::Model>)> {
    let placa = required(payload.placa, "placa")?;
    let marca = required(payload.marca, "marca")?;
    let modelo = required(payload.modelo, "modelo")?;

    let override_owner = payload
        .propietario_cedula
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let propietario = match override_owner {
        Some(cedula) if claims.is_admin() && cedula != claims.cedula => {
            usuario::Entity::find_by_id(cedula.clone())
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::BadRequest("El propietario no existe".to_string()))?;
            cedula
        }
        _ => claims.cedula.clone(),
    };

    let new_vehiculo = vehiculo::ActiveModel {
        placa: Set(placa),
        marca: Set(marca),
        modelo: Set(modelo),
        propietario_cedula: Set(propietario),
        fecha_registro: Set(Utc::now().into()),
    };

    let vehiculo = new_vehiculo
        .insert(&state.db)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Vehículo ya existe"))?;

    tracing::info!(
        placa = %vehiculo.placa,
        propietario = %vehiculo.propietario_cedula,
        "Vehicle registered"
    );

    Ok((StatusCode::CREATED, Json(vehiculo)))
}

/// Update brand and model. Plate and owner never change.
pub async fn update_vehiculo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(placa): Path<String>,
    AppJson(payload): AppJson<UpdateVehiculoRequest>,
) -> AppResult<Json<vehiculo::Model>> {
    let (marca, modelo) = match (payload.marca, payload.modelo) {
        (Some(marca), Some(modelo)) if !marca.trim().is_empty() && !modelo.trim().is_empty() => {
            (marca.trim().to_string(), modelo.trim().to_string())
        }
        _ => {
            return Err(AppError::BadRequest(
                "Marca y modelo obligatorios".to_string(),
            ))
        }
    };

    let vehiculo = find_vehiculo(&state, &placa).await?;
    ensure_owner_or_admin(&claims, &vehiculo.propietario_cedula)?;

    let mut active: vehiculo::ActiveModel = vehiculo.into();
    active.marca = Set(marca);
    active.modelo = Set(modelo);

    let updated = active.update(&state.db).await?;
    tracing::info!(placa = %updated.placa, "Vehicle updated");

    Ok(Json(updated))
}

/// Delete a vehicle; dependent revisions and informes cascade in the database
pub async fn delete_vehiculo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(placa): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let vehiculo = find_vehiculo(&state, &placa).await?;
    ensure_owner_or_admin(&claims, &vehiculo.propietario_cedula)?;

    vehiculo::Entity::delete_by_id(vehiculo.placa.clone())
        .exec(&state.db)
        .await?;

    tracing::info!(placa = %vehiculo.placa, "Vehicle deleted");

    Ok(Json(serde_json::json!({ "mensaje": "Vehículo eliminado" })))
}

async fn find_vehiculo(state: &AppState, placa: &str) -> AppResult<vehiculo::Model> {
    vehiculo::Entity::find_by_id(placa.to_string())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))
}
