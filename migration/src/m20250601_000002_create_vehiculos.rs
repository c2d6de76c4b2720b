use sea_orm_migration::{prelude::*, schema::*};

use super::m20250601_000001_create_usuarios::Usuarios;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehiculos::Table)
                    .if_not_exists()
                    .col(string_len(Vehiculos::Placa, 20).primary_key())
                    .col(string_len(Vehiculos::Marca, 60).not_null())
                    .col(string_len(Vehiculos::Modelo, 60).not_null())
                    .col(string_len(Vehiculos::PropietarioCedula, 30).not_null())
                    .col(
                        timestamp_with_time_zone(Vehiculos::FechaRegistro)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehiculo_propietario")
                            .from(Vehiculos::Table, Vehiculos::PropietarioCedula)
                            .to(Usuarios::Table, Usuarios::Cedula)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehiculos_propietario")
                    .table(Vehiculos::Table)
                    .col(Vehiculos::PropietarioCedula)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehiculos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehiculos {
    Table,
    Placa,
    Marca,
    Modelo,
    PropietarioCedula,
    FechaRegistro,
}
