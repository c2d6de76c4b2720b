use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Repuesto ids are chosen by the administrator, no sequence
        manager
            .create_table(
                Table::create()
                    .table(Repuestos::Table)
                    .if_not_exists()
                    .col(integer(Repuestos::Id).primary_key())
                    .col(string_len(Repuestos::Nombre, 100).not_null())
                    .col(double(Repuestos::Precio).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PrecioReparacion::Table)
                    .if_not_exists()
                    .col(pk_auto(PrecioReparacion::Id))
                    .col(integer(PrecioReparacion::RepuestoId).not_null())
                    .col(integer(PrecioReparacion::Cantidad).not_null())
                    .col(double(PrecioReparacion::ManoDeObra).not_null())
                    .col(double(PrecioReparacion::Total).not_null())
                    .col(
                        timestamp_with_time_zone(PrecioReparacion::Fecha)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_precio_reparacion_repuesto")
                            .from(PrecioReparacion::Table, PrecioReparacion::RepuestoId)
                            .to(Repuestos::Table, Repuestos::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrecioReparacion::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Repuestos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Repuestos {
    Table,
    Id,
    Nombre,
    Precio,
}

#[derive(DeriveIden)]
pub enum PrecioReparacion {
    Table,
    Id,
    RepuestoId,
    Cantidad,
    ManoDeObra,
    Total,
    Fecha,
}
