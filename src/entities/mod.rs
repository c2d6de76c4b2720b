pub mod informe;
pub mod precio_reparacion;
pub mod repuesto;
pub mod revision;
pub mod revision_repuesto;
pub mod usuario;
pub mod vehiculo;
