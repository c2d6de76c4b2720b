use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehiculos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    pub propietario_cedula: String,
    pub fecha_registro: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::PropietarioCedula",
        to = "super::usuario::Column::Cedula"
    )]
    Propietario,
    #[sea_orm(has_many = "super::revision::Entity")]
    Revisiones,
    #[sea_orm(has_many = "super::informe::Entity")]
    Informes,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Propietario.def()
    }
}

impl Related<super::revision::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revisiones.def()
    }
}

impl Related<super::informe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Informes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
