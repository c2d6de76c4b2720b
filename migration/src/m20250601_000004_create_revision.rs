use sea_orm_migration::{prelude::*, schema::*};

use super::m20250601_000002_create_vehiculos::Vehiculos;
use super::m20250601_000003_create_catalogo::PrecioReparacion;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Revision::Table)
                    .if_not_exists()
                    .col(pk_auto(Revision::Id))
                    .col(string_len(Revision::Placa, 20).not_null())
                    .col(string_len(Revision::Mecanico, 100).not_null())
                    .col(text(Revision::DetalleAveria).not_null())
                    .col(
                        string_len(Revision::Estado, 20)
                            .not_null()
                            .default("en_espera"),
                    )
                    .col(
                        boolean(Revision::RespuestaCliente)
                            .not_null()
                            .default(false),
                    )
                    .col(
                        timestamp_with_time_zone(Revision::FechaRevision)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revision_vehiculo")
                            .from(Revision::Table, Revision::Placa)
                            .to(Vehiculos::Table, Vehiculos::Placa)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_revision_placa_estado")
                    .table(Revision::Table)
                    .col(Revision::Placa)
                    .col(Revision::Estado)
                    .to_owned(),
            )
            .await?;

        // The composite key rejects attaching the same line item twice
        manager
            .create_table(
                Table::create()
                    .table(RevisionRepuestos::Table)
                    .if_not_exists()
                    .col(integer(RevisionRepuestos::RevisionId).not_null())
                    .col(integer(RevisionRepuestos::PrecioReparacionId).not_null())
                    .primary_key(
                        Index::create()
                            .col(RevisionRepuestos::RevisionId)
                            .col(RevisionRepuestos::PrecioReparacionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revision_repuestos_revision")
                            .from(RevisionRepuestos::Table, RevisionRepuestos::RevisionId)
                            .to(Revision::Table, Revision::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revision_repuestos_precio")
                            .from(
                                RevisionRepuestos::Table,
                                RevisionRepuestos::PrecioReparacionId,
                            )
                            .to(PrecioReparacion::Table, PrecioReparacion::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RevisionRepuestos::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Revision::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Revision {
    Table,
    Id,
    Placa,
    Mecanico,
    DetalleAveria,
    Estado,
    RespuestaCliente,
    FechaRevision,
}

#[derive(DeriveIden)]
pub enum RevisionRepuestos {
    Table,
    RevisionId,
    PrecioReparacionId,
}
