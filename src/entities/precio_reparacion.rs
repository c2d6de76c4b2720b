use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A priced repair line: part, quantity and labor. Immutable once created.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "precio_reparacion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub repuesto_id: i32,
    pub cantidad: i32,
    pub mano_de_obra: f64,
    pub total: f64,
    pub fecha: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repuesto::Entity",
        from = "Column::RepuestoId",
        to = "super::repuesto::Column::Id"
    )]
    Repuesto,
}

impl Related<super::repuesto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repuesto.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Line total: `cantidad * precio + mano_de_obra`
pub fn line_total(cantidad: i32, precio: f64, mano_de_obra: f64) -> f64 {
    f64::from(cantidad) * precio + mano_de_obra
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_includes_labor() {
        assert_eq!(line_total(2, 12500.0, 8000.0), 33000.0);
    }

    #[test]
    fn test_line_total_labor_only() {
        assert_eq!(line_total(1, 0.0, 15000.0), 15000.0);
    }
}
