use axum::{extract::State, Json};
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entities::usuario;
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct UsuarioResumen {
    pub cedula: String,
    pub nombre: String,
}

/// List every user, for the owner picker on vehicle forms (admin)
pub async fn list_usuarios(State(state): State<AppState>) -> AppResult<Json<Vec<UsuarioResumen>>> {
    let users = usuario::Entity::find()
        .order_by_asc(usuario::Column::Nombre)
        .all(&state.db)
        .await?;

    let responses = users
        .into_iter()
        .map(|u| UsuarioResumen {
            cedula: u.cedula,
            nombre: u.nombre,
        })
        .collect();

    Ok(Json(responses))
}
