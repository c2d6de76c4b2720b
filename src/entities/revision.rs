use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum EstadoRevision {
    #[sea_orm(string_value = "en_espera")]
    EnEspera,
    /// Rows written by older clients; treated like `EnEspera`
    #[sea_orm(string_value = "diagnostico")]
    Diagnostico,
    #[sea_orm(string_value = "reparacion")]
    Reparacion,
    #[sea_orm(string_value = "entrega")]
    Entrega,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

impl EstadoRevision {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en_espera" => Some(EstadoRevision::EnEspera),
            "diagnostico" => Some(EstadoRevision::Diagnostico),
            "reparacion" => Some(EstadoRevision::Reparacion),
            "entrega" => Some(EstadoRevision::Entrega),
            "cancelado" => Some(EstadoRevision::Cancelado),
            _ => None,
        }
    }

    /// Still waiting on the client's decision
    pub fn awaiting_decision(self) -> bool {
        matches!(self, EstadoRevision::EnEspera | EstadoRevision::Diagnostico)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EstadoRevision::EnEspera => "en_espera",
            EstadoRevision::Diagnostico => "diagnostico",
            EstadoRevision::Reparacion => "reparacion",
            EstadoRevision::Entrega => "entrega",
            EstadoRevision::Cancelado => "cancelado",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revision")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub placa: String,
    pub mecanico: String,
    #[sea_orm(column_type = "Text")]
    pub detalle_averia: String,
    pub estado: EstadoRevision,
    pub respuesta_cliente: bool,
    pub fecha_revision: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehiculo::Entity",
        from = "Column::Placa",
        to = "super::vehiculo::Column::Placa"
    )]
    Vehiculo,
    #[sea_orm(has_many = "super::revision_repuesto::Entity")]
    Repuestos,
}

impl Related<super::vehiculo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehiculo.def()
    }
}

impl Related<super::revision_repuesto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repuestos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
