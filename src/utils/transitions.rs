//! Allowed state changes for revisions and invoices.

use crate::entities::informe::EstadoFactura;
use crate::entities::revision::EstadoRevision;
use crate::error::AppError;

/// What a client decision on a revision amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionChange {
    /// The client keeps the revision waiting; nothing is written
    Hold,
    /// Approve (`reparacion`) or reject (`cancelado`); marks the client as responded
    Decide(EstadoRevision),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    AlreadyDecided(EstadoRevision),
    Unreachable {
        from: EstadoRevision,
        to: EstadoRevision,
    },
    RespuestaReset,
    AlreadyPaid,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyDecided(estado) => AppError::Conflict(format!(
                "La revisión ya fue respondida (estado: {})",
                estado.as_str()
            )),
            TransitionError::Unreachable { from, to } => AppError::BadRequest(format!(
                "Transición de estado no permitida: {} -> {}",
                from.as_str(),
                to.as_str()
            )),
            TransitionError::RespuestaReset => AppError::BadRequest(
                "respuesta_cliente no puede volver a false".to_string(),
            ),
            TransitionError::AlreadyPaid => {
                AppError::Conflict("La factura ya fue pagada".to_string())
            }
        }
    }
}

/// Validate a client decision against the current revision state.
///
/// `entrega` is never reachable here; only generating an informe produces it.
pub fn plan_revision_change(
    current: EstadoRevision,
    requested: EstadoRevision,
    respuesta_cliente: Option<bool>,
) -> Result<RevisionChange, TransitionError> {
    if !current.awaiting_decision() {
        return Err(TransitionError::AlreadyDecided(current));
    }

    match requested {
        EstadoRevision::EnEspera | EstadoRevision::Diagnostico => Ok(RevisionChange::Hold),
        EstadoRevision::Reparacion | EstadoRevision::Cancelado => {
            if respuesta_cliente == Some(false) {
                return Err(TransitionError::RespuestaReset);
            }
            Ok(RevisionChange::Decide(requested))
        }
        EstadoRevision::Entrega => Err(TransitionError::Unreachable {
            from: current,
            to: requested,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacturaChange {
    Unchanged,
    Pay,
}

/// `pendiente --(pay + sign)--> pagado`, and `pagado` is terminal
pub fn plan_factura_change(
    current: EstadoFactura,
    requested: EstadoFactura,
) -> Result<FacturaChange, TransitionError> {
    match (current, requested) {
        (EstadoFactura::Pagado, _) => Err(TransitionError::AlreadyPaid),
        (EstadoFactura::Pendiente, EstadoFactura::Pendiente) => Ok(FacturaChange::Unchanged),
        (EstadoFactura::Pendiente, EstadoFactura::Pagado) => Ok(FacturaChange::Pay),
    }
}
