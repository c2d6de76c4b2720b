use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repuestos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub nombre: String,
    pub precio: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::precio_reparacion::Entity")]
    Reparaciones,
}

impl Related<super::precio_reparacion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reparaciones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
