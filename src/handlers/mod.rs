pub mod auth;
pub mod catalogo;
pub mod informes;
pub mod revision;
pub mod usuarios;
pub mod vehiculos;
