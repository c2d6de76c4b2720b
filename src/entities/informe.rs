use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum EstadoFactura {
    #[sea_orm(string_value = "pendiente")]
    Pendiente,
    #[sea_orm(string_value = "pagado")]
    Pagado,
}

impl EstadoFactura {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pendiente" => Some(EstadoFactura::Pendiente),
            "pagado" => Some(EstadoFactura::Pagado),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "informe")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub placa: String,
    #[sea_orm(column_type = "Text")]
    pub detalle_informe: String,
    pub estado_factura: EstadoFactura,
    /// PNG bytes of the client's signature, present once paid
    #[sea_orm(column_type = "Blob", nullable)]
    #[serde(skip)]
    pub signature: Option<Vec<u8>>,
    pub total_general: f64,
    pub fecha: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehiculo::Entity",
        from = "Column::Placa",
        to = "super::vehiculo::Column::Placa"
    )]
    Vehiculo,
}

impl Related<super::vehiculo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehiculo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
