pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_usuarios;
mod m20250601_000002_create_vehiculos;
mod m20250601_000003_create_catalogo;
mod m20250601_000004_create_revision;
mod m20250601_000005_create_informe;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_usuarios::Migration),
            Box::new(m20250601_000002_create_vehiculos::Migration),
            Box::new(m20250601_000003_create_catalogo::Migration),
            Box::new(m20250601_000004_create_revision::Migration),
            Box::new(m20250601_000005_create_informe::Migration),
        ]
    }
}
