//! HTTP client for the taller API, as used by the mobile app.
//!
//! Holds the base URL and, after a successful login, the session token and
//! user. Every call maps a non-2xx answer to [`ClientError::Api`] carrying
//! the server's `error` message.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::entities::{repuesto, revision, vehiculo};
use crate::handlers::auth::{LoginResponse, RegisterResponse, UsuarioInfo};
use crate::handlers::catalogo::{RepuestoCreado, ReparacionResponse};
use crate::handlers::informes::{InformeCreado, InformeResponse};
use crate::handlers::revision::RevisionDetail;
use crate::handlers::usuarios::UsuarioResumen;

pub const UNREACHABLE_MESSAGE: &str = "No se pudo conectar con el servidor.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("No se pudo conectar con el servidor.")]
    Unreachable(#[source] reqwest::Error),

    #[error("Debe iniciar sesión")]
    NotLoggedIn,

    #[error("Respuesta inválida del servidor: {0}")]
    Decode(#[source] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Token and user kept after login
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub usuario: UsuarioInfo,
}

/// Client answer to a diagnosed revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Approve the repair
    Continuar,
    /// Reject the repair
    Rechazar,
    /// Keep thinking; acknowledged locally, nothing is sent
    EnEspera,
}

/// Outcome of [`ApiClient::decide_revision`]
#[derive(Debug)]
pub enum DecisionOutcome {
    Sent(RevisionDetail),
    Pending,
}

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub cedula: &'a str,
    pub nombre: &'a str,
    pub telefono: &'a str,
    pub correo: &'a str,
    pub contrasena: &'a str,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let session = self.session.as_ref().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(&session.token))
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await.map_err(ClientError::Unreachable)?;
        let response = Self::check(response).await?;
        response.json::<T>().await.map_err(ClientError::Decode)
    }

    fn with_rango(builder: RequestBuilder, rango: Option<&str>) -> RequestBuilder {
        match rango {
            Some(rango) => builder.query(&[("rango", rango)]),
            None => builder,
        }
    }

    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Error desconocido")
                .to_string(),
        };

        tracing::debug!(status = %status, message = %message, "API call rejected");
        Err(ClientError::Api { status, message })
    }

    // ============ Auth ============

    pub async fn register(&self, account: &NewAccount<'_>) -> ClientResult<RegisterResponse> {
        let body = json!({
            "cedula": account.cedula,
            "nombre": account.nombre,
            "telefono": account.telefono,
            "correo": account.correo,
            "contrasena": account.contrasena,
        });
        Self::send(self.request(Method::POST, "/register").json(&body)).await
    }

    /// Log in and keep the session for later calls
    pub async fn login(&mut self, cedula: &str, contrasena: &str) -> ClientResult<&UsuarioInfo> {
        let body = json!({ "cedula": cedula, "contrasena": contrasena });
        let response: LoginResponse =
            Self::send(self.request(Method::POST, "/login").json(&body)).await?;

        let session = self.session.insert(Session {
            token: response.token,
            usuario: response.usuario,
        });
        Ok(&session.usuario)
    }

    pub fn logout(&mut self) {
        self.session = None;
    }

    pub async fn list_usuarios(&self) -> ClientResult<Vec<UsuarioResumen>> {
        Self::send(self.authed(Method::GET, "/usuarios")?).await
    }

    // ============ Vehicles ============

    pub async fn list_vehiculos(&self) -> ClientResult<Vec<vehiculo::Model>> {
        Self::send(self.authed(Method::GET, "/vehiculos")?).await
    }

    /// Register a vehicle; `propietario_cedula` only matters for admins
    pub async fn create_vehiculo(
        &self,
        placa: &str,
        marca: &str,
        modelo: &str,
        propietario_cedula: Option<&str>,
    ) -> ClientResult<vehiculo::Model> {
        let mut body = json!({ "placa": placa, "marca": marca, "modelo": modelo });
        if let Some(cedula) = propietario_cedula {
            body["propietario_cedula"] = Value::String(cedula.to_string());
        }
        Self::send(self.authed(Method::POST, "/vehiculos")?.json(&body)).await
    }

    pub async fn update_vehiculo(
        &self,
        placa: &str,
        marca: &str,
        modelo: &str,
    ) -> ClientResult<vehiculo::Model> {
        let body = json!({ "marca": marca, "modelo": modelo });
        Self::send(
            self.authed(Method::PUT, &format!("/vehiculos/{}", placa))?
                .json(&body),
        )
        .await
    }

    pub async fn delete_vehiculo(&self, placa: &str) -> ClientResult<()> {
        let _: Value = Self::send(self.authed(Method::DELETE, &format!("/vehiculos/{}", placa))?).await?;
        Ok(())
    }

    // ============ Catalog ============

    pub async fn list_repuestos(&self) -> ClientResult<Vec<repuesto::Model>> {
        Self::send(self.authed(Method::GET, "/repuestos")?).await
    }

    pub async fn create_repuesto(&self, id: i32, nombre: &str, precio: f64) -> ClientResult<repuesto::Model> {
        let body = json!({ "id": id, "nombre": nombre, "precio": precio });
        let created: RepuestoCreado =
            Self::send(self.authed(Method::POST, "/repuestos")?.json(&body)).await?;
        Ok(created.repuesto)
    }

    pub async fn list_reparaciones(&self) -> ClientResult<Vec<ReparacionResponse>> {
        Self::send(self.authed(Method::GET, "/reparaciones")?).await
    }

    pub async fn create_reparacion(
        &self,
        repuesto_id: i32,
        cantidad: i32,
        mano_de_obra: f64,
    ) -> ClientResult<ReparacionResponse> {
        let body = json!({
            "repuesto_id": repuesto_id,
            "cantidad": cantidad,
            "mano_de_obra": mano_de_obra,
        });
        Self::send(self.authed(Method::POST, "/reparaciones")?.json(&body)).await
    }

    // ============ Revisions ============

    /// Revisions visible to the caller; `rango` is one of `siempre`,
    /// `semana`, `2semanas`, `3semanas` or `mes`
    pub async fn list_revisiones(&self, rango: Option<&str>) -> ClientResult<Vec<RevisionDetail>> {
        let builder = Self::with_rango(self.authed(Method::GET, "/revision")?, rango);
        Self::send(builder).await
    }

    pub async fn get_revision(&self, id: i32) -> ClientResult<RevisionDetail> {
        Self::send(self.authed(Method::GET, &format!("/revision/{}", id))?).await
    }

    pub async fn create_revision(
        &self,
        placa: &str,
        mecanico: &str,
        detalle_averia: &str,
    ) -> ClientResult<revision::Model> {
        let body = json!({
            "placa": placa,
            "mecanico": mecanico,
            "detalle_averia": detalle_averia,
        });
        Self::send(self.authed(Method::POST, "/revision")?.json(&body)).await
    }

    pub async fn attach_repuesto(
        &self,
        revision_id: i32,
        precio_reparacion_id: i32,
    ) -> ClientResult<RevisionDetail> {
        let body = json!({ "precio_reparacion_id": precio_reparacion_id });
        Self::send(
            self.authed(Method::POST, &format!("/revision/{}/repuestos", revision_id))?
                .json(&body),
        )
        .await
    }

    /// Send the client's answer on a revision
    pub async fn decide_revision(&self, id: i32, decision: Decision) -> ClientResult<DecisionOutcome> {
        let estado = match decision {
            Decision::Continuar => "reparacion",
            Decision::Rechazar => "cancelado",
            Decision::EnEspera => {
                if self.session.is_none() {
                    return Err(ClientError::NotLoggedIn);
                }
                tracing::debug!(id, "Revision left pending by the client");
                return Ok(DecisionOutcome::Pending);
            }
        };

        let body = json!({ "estado": estado, "respuesta_cliente": true });
        let detail = Self::send(
            self.authed(Method::PATCH, &format!("/revision/{}", id))?
                .json(&body),
        )
        .await?;
        Ok(DecisionOutcome::Sent(detail))
    }

    // ============ Informes ============

    /// Every informe (admin), optionally within a date window
    pub async fn list_informes(&self, rango: Option<&str>) -> ClientResult<Vec<InformeResponse>> {
        let builder = Self::with_rango(self.authed(Method::GET, "/informes")?, rango);
        Self::send(builder).await
    }

    /// Informes of the caller's own vehicles
    pub async fn list_informes_cliente(&self) -> ClientResult<Vec<InformeResponse>> {
        Self::send(self.authed(Method::GET, "/informes-cliente")?).await
    }

    pub async fn get_informe(&self, id: i32) -> ClientResult<InformeResponse> {
        Self::send(self.authed(Method::GET, &format!("/informes/{}", id))?).await
    }

    pub async fn create_informe(&self, placa: &str, detalle_informe: &str) -> ClientResult<InformeCreado> {
        let body = json!({ "placa": placa, "detalle_informe": detalle_informe });
        Self::send(self.authed(Method::POST, "/informes")?.json(&body)).await
    }

    /// Pay an informe with the PNG captured on the signature pad
    pub async fn pay_informe(&self, id: i32, signature_png: &[u8]) -> ClientResult<InformeResponse> {
        let body = json!({
            "estado_factura": "pagado",
            "signature": STANDARD.encode(signature_png),
        });
        Self::send(
            self.authed(Method::PUT, &format!("/informes/{}/estado", id))?
                .json(&body),
        )
        .await
    }
}
