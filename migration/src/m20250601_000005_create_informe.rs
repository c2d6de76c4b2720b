use sea_orm_migration::{prelude::*, schema::*};

use super::m20250601_000002_create_vehiculos::Vehiculos;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Informe::Table)
                    .if_not_exists()
                    .col(pk_auto(Informe::Id))
                    .col(string_len(Informe::Placa, 20).not_null())
                    .col(text(Informe::DetalleInforme).not_null())
                    .col(
                        string_len(Informe::EstadoFactura, 20)
                            .not_null()
                            .default("pendiente"),
                    )
                    .col(blob_null(Informe::Signature))
                    .col(double(Informe::TotalGeneral).not_null().default(0.0))
                    .col(
                        timestamp_with_time_zone(Informe::Fecha)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_informe_vehiculo")
                            .from(Informe::Table, Informe::Placa)
                            .to(Vehiculos::Table, Vehiculos::Placa)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Informe::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Informe {
    Table,
    Id,
    Placa,
    DetalleInforme,
    EstadoFactura,
    Signature,
    TotalGeneral,
    Fecha,
}
