use chrono::{DateTime, Duration, Months, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?rango=` on the admin listings
#[derive(Debug, Default, Deserialize)]
pub struct RangoQuery {
    pub rango: Option<String>,
}

impl RangoQuery {
    /// Missing or blank means no limit
    pub fn resolve(&self) -> AppResult<RangoFecha> {
        match self.rango.as_deref().map(str::trim) {
            None | Some("") => Ok(RangoFecha::Siempre),
            Some(value) => RangoFecha::parse(value)
                .ok_or_else(|| AppError::BadRequest(format!("Rango de fechas inválido: {}", value))),
        }
    }
}

/// Date window counted back from now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangoFecha {
    Siempre,
    Semana,
    DosSemanas,
    TresSemanas,
    Mes,
}

impl RangoFecha {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "siempre" => Some(RangoFecha::Siempre),
            "semana" => Some(RangoFecha::Semana),
            "2semanas" => Some(RangoFecha::DosSemanas),
            "3semanas" => Some(RangoFecha::TresSemanas),
            "mes" => Some(RangoFecha::Mes),
            _ => None,
        }
    }

    /// Oldest date still inside the window, `None` for no limit
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RangoFecha::Siempre => None,
            RangoFecha::Semana => Some(now - Duration::days(7)),
            RangoFecha::DosSemanas => Some(now - Duration::days(14)),
            RangoFecha::TresSemanas => Some(now - Duration::days(21)),
            RangoFecha::Mes => now.checked_sub_months(Months::new(1)),
        }
    }
}
