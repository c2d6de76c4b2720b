use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entities::precio_reparacion::{self, line_total};
use crate::entities::repuesto;
use crate::error::{AppError, AppResult};
use crate::utils::validation::{required, required_value, AppJson};
use crate::AppState;

// ============ Repuestos ============

#[derive(Debug, Deserialize)]
pub struct CreateRepuestoRequest {
    pub id: Option<i32>,
    pub nombre: Option<String>,
    pub precio: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RepuestoCreado {
    pub mensaje: String,
    pub repuesto: repuesto::Model,
}

/// List the parts catalog ordered by id
pub async fn list_repuestos(State(state): State<AppState>) -> AppResult<Json<Vec<repuesto::Model>>> {
    let repuestos = repuesto::Entity::find()
        .order_by_asc(repuesto::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(repuestos))
}

/// Add a part with an administrator-chosen id (admin)
pub async fn create_repuesto(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRepuestoRequest>,
) -> AppResult<(StatusCode, Json<RepuestoCreado>)> {
    let id = required_value(payload.id, "id")?;
    let nombre = required(payload.nombre, "nombre")?;
    let precio = required_value(payload.precio, "precio")?;

    if !precio.is_finite() || precio < 0.0 {
        return Err(AppError::BadRequest("El precio no puede ser negativo".to_string()));
    }

    let repuesto = repuesto::ActiveModel {
        id: Set(id),
        nombre: Set(nombre),
        precio: Set(precio),
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "ID ya existe"))?;

    tracing::info!(id = repuesto.id, nombre = %repuesto.nombre, "Part created");

    Ok((
        StatusCode::CREATED,
        Json(RepuestoCreado {
            mensaje: "Repuesto creado".to_string(),
            repuesto,
        }),
    ))
}

// ============ Reparaciones (priced line items) ============

#[derive(Debug, Deserialize)]
pub struct CreateReparacionRequest {
    pub repuesto_id: Option<i32>,
    pub cantidad: Option<i32>,
    pub mano_de_obra: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReparacionResponse {
    pub id: i32,
    pub repuesto_id: i32,
    pub repuesto_nombre: String,
    pub cantidad: i32,
    pub mano_de_obra: f64,
    pub total: f64,
    pub fecha: DateTime<Utc>,
}

impl ReparacionResponse {
    fn new(line: precio_reparacion::Model, repuesto_nombre: String) -> Self {
        Self {
            id: line.id,
            repuesto_id: line.repuesto_id,
            repuesto_nombre,
            cantidad: line.cantidad,
            mano_de_obra: line.mano_de_obra,
            total: line.total,
            fecha: line.fecha.with_timezone(&Utc),
        }
    }
}

/// List priced line items with their part name, most recent first
pub async fn list_reparaciones(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReparacionResponse>>> {
    let lines = precio_reparacion::Entity::find()
        .find_also_related(repuesto::Entity)
        .order_by_desc(precio_reparacion::Column::Fecha)
        .order_by_desc(precio_reparacion::Column::Id)
        .all(&state.db)
        .await?;

    let responses = lines
        .into_iter()
        .map(|(line, repuesto)| {
            let nombre = repuesto.map(|r| r.nombre).unwrap_or_default();
            ReparacionResponse::new(line, nombre)
        })
        .collect();

    Ok(Json(responses))
}

/// Price a repair line. The total is fixed from the part's current price.
pub async fn create_reparacion(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateReparacionRequest>,
) -> AppResult<(StatusCode, Json<ReparacionResponse>)> {
    let repuesto_id = required_value(payload.repuesto_id, "repuesto_id")?;
    let cantidad = required_value(payload.cantidad, "cantidad")?;
    let mano_de_obra = required_value(payload.mano_de_obra, "mano_de_obra")?;

    if cantidad <= 0 {
        return Err(AppError::BadRequest("La cantidad debe ser positiva".to_string()));
    }
    if !mano_de_obra.is_finite() || mano_de_obra < 0.0 {
        return Err(AppError::BadRequest(
            "La mano de obra no puede ser negativa".to_string(),
        ));
    }

    let repuesto = repuesto::Entity::find_by_id(repuesto_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("El repuesto no existe".to_string()))?;

    let line = precio_reparacion::ActiveModel {
        repuesto_id: Set(repuesto.id),
        cantidad: Set(cantidad),
        mano_de_obra: Set(mano_de_obra),
        total: Set(line_total(cantidad, repuesto.precio, mano_de_obra)),
        fecha: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = line.id, repuesto = repuesto.id, total = line.total, "Repair line priced");

    Ok((
        StatusCode::CREATED,
        Json(ReparacionResponse::new(line, repuesto.nombre)),
    ))
}
