use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Roles are stored as plain strings ("cliente" / "administrador")
        manager
            .create_table(
                Table::create()
                    .table(Usuarios::Table)
                    .if_not_exists()
                    .col(string_len(Usuarios::Cedula, 30).primary_key())
                    .col(string_len(Usuarios::Nombre, 100).not_null())
                    .col(string_len(Usuarios::Telefono, 30).not_null())
                    .col(string_len(Usuarios::Correo, 255).not_null().unique_key())
                    .col(string_len(Usuarios::ContrasenaHash, 255).not_null())
                    .col(
                        string_len(Usuarios::Rol, 20)
                            .not_null()
                            .default("cliente"),
                    )
                    .col(
                        timestamp_with_time_zone(Usuarios::FechaRegistro)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usuarios::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Usuarios {
    Table,
    Cedula,
    Nombre,
    Telefono,
    Correo,
    ContrasenaHash,
    Rol,
    FechaRegistro,
}
