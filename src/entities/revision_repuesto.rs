use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revision_repuestos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub revision_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub precio_reparacion_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::revision::Entity",
        from = "Column::RevisionId",
        to = "super::revision::Column::Id"
    )]
    Revision,
    #[sea_orm(
        belongs_to = "super::precio_reparacion::Entity",
        from = "Column::PrecioReparacionId",
        to = "super::precio_reparacion::Column::Id"
    )]
    PrecioReparacion,
}

impl Related<super::revision::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revision.def()
    }
}

impl Related<super::precio_reparacion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrecioReparacion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
