use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::revision::{self, EstadoRevision};
use crate::entities::{precio_reparacion, repuesto, revision_repuesto, vehiculo};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ensure_owner_or_admin;
use crate::utils::jwt::Claims;
use crate::utils::rango::RangoQuery;
use crate::utils::transitions::{plan_revision_change, RevisionChange};
use crate::utils::validation::{required, AppJson};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRevisionRequest {
    pub placa: Option<String>,
    pub mecanico: Option<String>,
    pub detalle_averia: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachRepuestoRequest {
    pub precio_reparacion_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRevisionRequest {
    pub estado: Option<String>,
    pub respuesta_cliente: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepuestoUsado {
    pub precio_reparacion_id: i32,
    pub repuesto_nombre: String,
    pub cantidad: i32,
    pub mano_de_obra: f64,
    pub total_repuesto: f64,
}

/// A revision joined with its vehicle and the repair lines applied to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionDetail {
    pub id: i32,
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    pub propietario_cedula: String,
    pub mecanico: String,
    pub detalle_averia: String,
    pub estado: EstadoRevision,
    pub respuesta_cliente: bool,
    pub fecha_revision: DateTime<Utc>,
    pub repuestos_usados: Vec<RepuestoUsado>,
    pub total_repuestos: f64,
}

/// Load the applied repair lines of each revision, keyed by revision id
pub async fn load_repuestos_usados<C: ConnectionTrait>(
    db: &C,
    revision_ids: &[i32],
) -> Result<HashMap<i32, Vec<RepuestoUsado>>, sea_orm::DbErr> {
    let mut usados: HashMap<i32, Vec<RepuestoUsado>> = HashMap::new();
    if revision_ids.is_empty() {
        return Ok(usados);
    }

    let links = revision_repuesto::Entity::find()
        .filter(revision_repuesto::Column::RevisionId.is_in(revision_ids.iter().copied()))
        .all(db)
        .await?;

    let line_ids: Vec<i32> = links.iter().map(|l| l.precio_reparacion_id).collect();
    let lines: HashMap<i32, (precio_reparacion::Model, Option<repuesto::Model>)> =
        precio_reparacion::Entity::find()
            .find_also_related(repuesto::Entity)
            .filter(precio_reparacion::Column::Id.is_in(line_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|(line, repuesto)| (line.id, (line, repuesto)))
            .collect();

    for link in links {
        if let Some((line, repuesto)) = lines.get(&link.precio_reparacion_id) {
            usados.entry(link.revision_id).or_default().push(RepuestoUsado {
                precio_reparacion_id: line.id,
                repuesto_nombre: repuesto.as_ref().map(|r| r.nombre.clone()).unwrap_or_default(),
                cantidad: line.cantidad,
                mano_de_obra: line.mano_de_obra,
                total_repuesto: line.total,
            });
        }
    }

    for entries in usados.values_mut() {
        entries.sort_by_key(|l| l.precio_reparacion_id);
    }

    Ok(usados)
}

async fn build_details<C: ConnectionTrait>(
    db: &C,
    revisions: Vec<revision::Model>,
) -> AppResult<Vec<RevisionDetail>> {
    let placas: Vec<String> = revisions.iter().map(|r| r.placa.clone()).collect();
    let vehiculos: HashMap<String, vehiculo::Model> = vehiculo::Entity::find()
        .filter(vehiculo::Column::Placa.is_in(placas))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.placa.clone(), v))
        .collect();

    let ids: Vec<i32> = revisions.iter().map(|r| r.id).collect();
    let mut usados = load_repuestos_usados(db, &ids).await?;

    let details = revisions
        .into_iter()
        .map(|r| {
            let vehiculo = vehiculos.get(&r.placa);
            let repuestos_usados = usados.remove(&r.id).unwrap_or_default();
            let total_repuestos = repuestos_usados
                .iter()
                .fold(0.0, |acc, l| acc + l.total_repuesto);

            RevisionDetail {
                id: r.id,
                marca: vehiculo.map(|v| v.marca.clone()).unwrap_or_default(),
                modelo: vehiculo.map(|v| v.modelo.clone()).unwrap_or_default(),
                propietario_cedula: vehiculo
                    .map(|v| v.propietario_cedula.clone())
                    .unwrap_or_default(),
                placa: r.placa,
                mecanico: r.mecanico,
                detalle_averia: r.detalle_averia,
                estado: r.estado,
                respuesta_cliente: r.respuesta_cliente,
                fecha_revision: r.fecha_revision.with_timezone(&Utc),
                repuestos_usados,
                total_repuestos,
            }
        })
        .collect();

    Ok(details)
}

async fn build_detail(state: &AppState, revision: revision::Model) -> AppResult<RevisionDetail> {
    build_details(&state.db, vec![revision])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Revision detail could not be built".to_string()))
}

async fn find_revision(state: &AppState, id: i32) -> AppResult<revision::Model> {
    revision::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Revisión no encontrada".to_string()))
}

/// Fetch the revision and check the caller owns its vehicle (or is admin)
async fn find_owned_revision(
    state: &AppState,
    claims: &Claims,
    id: i32,
) -> AppResult<revision::Model> {
    let revision = find_revision(state, id).await?;

    if !claims.is_admin() {
        let vehiculo = vehiculo::Entity::find_by_id(revision.placa.clone())
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        ensure_owner_or_admin(claims, &vehiculo.propietario_cedula)?;
    }

    Ok(revision)
}

/// List revisions with details: all for admins, own vehicles for clients.
/// `?rango=` limits the listing to recent revisions.
pub async fn list_revisiones(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<RangoQuery>,
) -> AppResult<Json<Vec<RevisionDetail>>> {
    let rango = params.resolve()?;

    let mut query = revision::Entity::find()
        .order_by_desc(revision::Column::FechaRevision)
        .order_by_desc(revision::Column::Id);

    if !claims.is_admin() {
        query = query
            .join(
                sea_orm::JoinType::InnerJoin,
                revision::Relation::Vehiculo.def(),
            )
            .filter(vehiculo::Column::PropietarioCedula.eq(&claims.cedula));
    }

    if let Some(cutoff) = rango.cutoff(Utc::now()) {
        query = query.filter(revision::Column::FechaRevision.gte(cutoff.fixed_offset()));
    }

    let revisions = query.all(&state.db).await?;
    let details = build_details(&state.db, revisions).await?;

    Ok(Json(details))
}

/// Get one revision with its applied repair lines
pub async fn get_revision(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> AppResult<Json<RevisionDetail>> {
    let revision = find_owned_revision(&state, &claims, id).await?;
    Ok(Json(build_detail(&state, revision).await?))
}

/// Open a revision for a vehicle (admin). Starts in `en_espera`.
pub async fn create_revision(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateRevisionRequest>,
) -> AppResult<(StatusCode, Json<revision::Model>)> {
    let placa = required(payload.placa, "placa")?;
    let mecanico = required(payload.mecanico, "mecanico")?;
    let detalle_averia = required(payload.detalle_averia, "detalle_averia")?;

    vehiculo::Entity::find_by_id(placa.clone())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

    let revision = revision::ActiveModel {
        placa: Set(placa),
        mecanico: Set(mecanico),
        detalle_averia: Set(detalle_averia),
        estado: Set(EstadoRevision::EnEspera),
        respuesta_cliente: Set(false),
        fecha_revision: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!(
        id = revision.id,
        placa = %revision.placa,
        admin = %claims.cedula,
        "Revision opened"
    );

    Ok((StatusCode::CREATED, Json(revision)))
}

/// Apply a priced repair line to a revision still awaiting the client (admin)
pub async fn attach_repuesto(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AttachRepuestoRequest>,
) -> AppResult<(StatusCode, Json<RevisionDetail>)> {
    let precio_reparacion_id = payload
        .precio_reparacion_id
        .ok_or_else(|| AppError::BadRequest("Falta precio_reparacion_id".to_string()))?;

    let revision = find_revision(&state, id).await?;
    if !revision.estado.awaiting_decision() {
        return Err(AppError::BadRequest(format!(
            "La revisión ya no admite repuestos (estado: {})",
            revision.estado.as_str()
        )));
    }

    precio_reparacion::Entity::find_by_id(precio_reparacion_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Reparación no encontrada".to_string()))?;

    let link = revision_repuesto::ActiveModel {
        revision_id: Set(revision.id),
        precio_reparacion_id: Set(precio_reparacion_id),
    };

    revision_repuesto::Entity::insert(link)
        .exec_without_returning(&state.db)
        .await
        .map_err(|e| {
            AppError::conflict_on_unique(e, "La reparación ya está asociada a la revisión")
        })?;

    tracing::info!(revision = revision.id, precio_reparacion_id, "Repair line attached");

    Ok((StatusCode::CREATED, Json(build_detail(&state, revision).await?)))
}

/// Record the client's decision on a revision.
///
/// Approve moves it to `reparacion`, reject to `cancelado`, both setting
/// `respuesta_cliente`. Asking for `en_espera` is a hold and writes nothing.
pub async fn update_revision(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRevisionRequest>,
) -> AppResult<Json<RevisionDetail>> {
    let requested = payload
        .estado
        .as_deref()
        .map(str::trim)
        .and_then(EstadoRevision::parse)
        .ok_or_else(|| AppError::BadRequest("Estado de revisión inválido".to_string()))?;

    let revision = find_owned_revision(&state, &claims, id).await?;

    match plan_revision_change(revision.estado, requested, payload.respuesta_cliente)? {
        RevisionChange::Hold => {
            tracing::info!(id, cedula = %claims.cedula, "Revision kept on hold");
            Ok(Json(build_detail(&state, revision).await?))
        }
        RevisionChange::Decide(estado) => {
            // Guarded on the current state so two racing decisions cannot both apply
            let result = revision::Entity::update_many()
                .col_expr(revision::Column::Estado, Expr::value(estado))
                .col_expr(revision::Column::RespuestaCliente, Expr::value(true))
                .filter(revision::Column::Id.eq(id))
                .filter(
                    revision::Column::Estado
                        .is_in([EstadoRevision::EnEspera, EstadoRevision::Diagnostico]),
                )
                .exec(&state.db)
                .await?;

            if result.rows_affected == 0 {
                return Err(AppError::Conflict(
                    "La revisión ya fue respondida".to_string(),
                ));
            }

            tracing::info!(
                id,
                cedula = %claims.cedula,
                estado = estado.as_str(),
                "Revision decided"
            );

            let updated = find_revision(&state, id).await?;
            Ok(Json(build_detail(&state, updated).await?))
        }
    }
}
