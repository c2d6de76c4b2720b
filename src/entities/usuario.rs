use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    #[sea_orm(string_value = "cliente")]
    Cliente,
    #[sea_orm(string_value = "administrador")]
    Administrador,
}

impl Rol {
    /// Parse the wire representation used by the register endpoint
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cliente" => Some(Rol::Cliente),
            "administrador" => Some(Rol::Administrador),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cedula: String,
    pub nombre: String,
    pub telefono: String,
    #[sea_orm(unique)]
    pub correo: String,
    #[serde(skip_serializing)]
    pub contrasena_hash: String,
    pub rol: Rol,
    pub fecha_registro: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehiculo::Entity")]
    Vehiculos,
}

impl Related<super::vehiculo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehiculos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
