use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::informe::{self, EstadoFactura};
use crate::entities::revision::{self, EstadoRevision};
use crate::entities::vehiculo;
use crate::error::{AppError, AppResult};
use crate::handlers::revision::load_repuestos_usados;
use crate::middleware::auth::ensure_owner_or_admin;
use crate::utils::jwt::Claims;
use crate::utils::rango::RangoQuery;
use crate::utils::signature::decode_signature;
use crate::utils::transitions::{plan_factura_change, FacturaChange};
use crate::utils::validation::{required, AppJson};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInformeRequest {
    pub placa: Option<String>,
    pub detalle_informe: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEstadoRequest {
    pub estado_factura: Option<String>,
    /// Base64 PNG from the signature pad, required to pay
    pub signature: Option<String>,
}

/// Informe as returned to callers; the signature blob stays server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformeResponse {
    pub id: i32,
    pub placa: String,
    pub detalle_informe: String,
    pub estado_factura: EstadoFactura,
    pub total_general: f64,
    pub fecha: DateTime<Utc>,
    pub firmado: bool,
}

impl From<informe::Model> for InformeResponse {
    fn from(i: informe::Model) -> Self {
        Self {
            id: i.id,
            placa: i.placa,
            detalle_informe: i.detalle_informe,
            estado_factura: i.estado_factura,
            total_general: i.total_general,
            fecha: i.fecha.with_timezone(&Utc),
            firmado: i.signature.is_some(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InformeCreado {
    pub informe: InformeResponse,
    /// Revisions moved from `reparacion` to `entrega` by this informe
    pub revisiones_entregadas: Vec<i32>,
}

async fn find_informe(state: &AppState, id: i32) -> AppResult<informe::Model> {
    informe::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Informe no encontrado".to_string()))
}

async fn find_owned_informe(state: &AppState, claims: &Claims, id: i32) -> AppResult<informe::Model> {
    let informe = find_informe(state, id).await?;

    if !claims.is_admin() {
        let vehiculo = vehiculo::Entity::find_by_id(informe.placa.clone())
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        ensure_owner_or_admin(claims, &vehiculo.propietario_cedula)?;
    }

    Ok(informe)
}

/// Insert the informe and deliver the vehicle's repairing revisions.
/// Runs entirely inside `txn`; the caller commits or rolls back.
async fn generate_informe(
    txn: &DatabaseTransaction,
    placa: &str,
    detalle_informe: &str,
) -> Result<(informe::Model, Vec<i32>), DbErr> {
    let en_reparacion = revision::Entity::find()
        .filter(revision::Column::Placa.eq(placa))
        .filter(revision::Column::Estado.eq(EstadoRevision::Reparacion))
        .all(txn)
        .await?;

    let ids: Vec<i32> = en_reparacion.iter().map(|r| r.id).collect();
    let usados = load_repuestos_usados(txn, &ids).await?;
    let total_general = usados
        .values()
        .flatten()
        .fold(0.0, |acc, l| acc + l.total_repuesto);

    let informe = informe::ActiveModel {
        placa: Set(placa.to_string()),
        detalle_informe: Set(detalle_informe.to_string()),
        estado_factura: Set(EstadoFactura::Pendiente),
        signature: Set(None),
        total_general: Set(total_general),
        fecha: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let result = revision::Entity::update_many()
        .col_expr(revision::Column::Estado, Expr::value(EstadoRevision::Entrega))
        .filter(revision::Column::Placa.eq(placa))
        .filter(revision::Column::Estado.eq(EstadoRevision::Reparacion))
        .exec(txn)
        .await?;

    tracing::debug!(
        informe = informe.id,
        delivered = result.rows_affected,
        "Revisions moved to entrega"
    );

    Ok((informe, ids))
}

/// Generate an informe for a vehicle (admin).
///
/// The insert and the `reparacion -> entrega` bulk update commit together
/// or not at all.
pub async fn create_informe(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateInformeRequest>,
) -> AppResult<(StatusCode, Json<InformeCreado>)> {
    let placa = required(payload.placa, "placa")?;
    let detalle_informe = required(payload.detalle_informe, "detalle_informe")?;

    vehiculo::Entity::find_by_id(placa.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

    let txn = state.db.begin().await?;

    let generated = generate_informe(&txn, &placa, &detalle_informe).await;
    let (informe, entregadas) = match generated {
        Ok(created) => created,
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            return Err(AppError::Internal(format!(
                "Informe generation for {} rolled back: {}",
                placa, e
            )));
        }
    };

    txn.commit()
        .await
        .map_err(|e| AppError::Internal(format!("Informe commit failed: {}", e)))?;

    if entregadas.is_empty() {
        tracing::warn!(placa = %placa, informe = informe.id, "Informe generated with no revision in reparacion");
    } else {
        tracing::info!(placa = %placa, informe = informe.id, revisiones = ?entregadas, "Informe generated");
    }

    Ok((
        StatusCode::CREATED,
        Json(InformeCreado {
            informe: informe.into(),
            revisiones_entregadas: entregadas,
        }),
    ))
}

/// List every informe, newest first, optionally within a date window (admin)
pub async fn list_informes(
    State(state): State<AppState>,
    Query(params): Query<RangoQuery>,
) -> AppResult<Json<Vec<InformeResponse>>> {
    let rango = params.resolve()?;

    let mut query = informe::Entity::find()
        .order_by_desc(informe::Column::Fecha)
        .order_by_desc(informe::Column::Id);

    if let Some(cutoff) = rango.cutoff(Utc::now()) {
        query = query.filter(informe::Column::Fecha.gte(cutoff.fixed_offset()));
    }

    let informes = query.all(&state.db).await?;
    tracing::debug!(rango = ?rango, count = informes.len(), "Informes listed");

    Ok(Json(informes.into_iter().map(Into::into).collect()))
}

/// List the informes of the caller's own vehicles, newest first
pub async fn list_informes_cliente(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<InformeResponse>>> {
    let informes = informe::Entity::find()
        .join(
            sea_orm::JoinType::InnerJoin,
            informe::Relation::Vehiculo.def(),
        )
        .filter(vehiculo::Column::PropietarioCedula.eq(&claims.cedula))
        .order_by_desc(informe::Column::Fecha)
        .order_by_desc(informe::Column::Id)
        .all(&state.db)
        .await?;

    tracing::debug!(cedula = %claims.cedula, count = informes.len(), "Client informes listed");

    Ok(Json(informes.into_iter().map(Into::into).collect()))
}

/// Get one informe (owner or admin)
pub async fn get_informe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> AppResult<Json<InformeResponse>> {
    let informe = find_owned_informe(&state, &claims, id).await?;
    Ok(Json(informe.into()))
}

/// Change the invoice status. Paying requires the client's signature,
/// stored in the same update as the new status.
pub async fn update_estado_informe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEstadoRequest>,
) -> AppResult<Json<InformeResponse>> {
    let requested = payload
        .estado_factura
        .as_deref()
        .map(str::trim)
        .and_then(EstadoFactura::parse)
        .ok_or_else(|| AppError::BadRequest("Estado de factura inválido".to_string()))?;

    let informe = find_owned_informe(&state, &claims, id).await?;

    match plan_factura_change(informe.estado_factura, requested)? {
        FacturaChange::Pay => {
            let signature = decode_signature(payload.signature.as_deref())?;
            let size = signature.len();

            let result = informe::Entity::update_many()
                .col_expr(informe::Column::EstadoFactura, Expr::value(EstadoFactura::Pagado))
                .col_expr(informe::Column::Signature, Expr::value(signature))
                .filter(informe::Column::Id.eq(id))
                .filter(informe::Column::EstadoFactura.eq(EstadoFactura::Pendiente))
                .exec(&state.db)
                .await?;

            if result.rows_affected == 0 {
                return Err(AppError::Conflict("La factura ya fue pagada".to_string()));
            }

            tracing::info!(id, cedula = %claims.cedula, signature_bytes = size, "Informe paid and signed");

            Ok(Json(find_informe(&state, id).await?.into()))
        }
        FacturaChange::Unchanged => Ok(Json(informe.into())),
    }
}
