#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

use taller_backend::{
    config::Config,
    entities::usuario::{self, Rol},
    routes,
    utils::{jwt::create_token, password::hash_password},
    AppState,
};

pub const SECRET: &str = "secreto-de-pruebas";
pub const PASSWORD: &str = "clave-segura";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub config: Config,
}

pub fn test_config(jwt_secret: Option<&str>) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: jwt_secret.map(str::to_string),
        jwt_expiration_hours: 8,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        body_limit_bytes: 5 * 1024 * 1024,
        admin_seed: None,
    }
}

/// Fresh in-memory database with the schema applied.
/// A single pooled connection keeps the in-memory database alive.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.expect("sqlite connection");
    migration::Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn setup() -> TestApp {
    setup_with(test_config(Some(SECRET))).await
}

pub async fn setup_with(config: Config) -> TestApp {
    let db = test_db().await;
    let router = routes::create_router(AppState {
        db: db.clone(),
        config: config.clone(),
    });
    TestApp { router, db, config }
}

impl TestApp {
    /// Insert a user directly and return a token for it
    pub async fn user(&self, cedula: &str, rol: Rol) -> String {
        usuario::ActiveModel {
            cedula: Set(cedula.to_string()),
            nombre: Set(format!("Usuario {}", cedula)),
            telefono: Set("88888888".to_string()),
            correo: Set(format!("{}@correo.test", cedula)),
            contrasena_hash: Set(hash_password(PASSWORD).unwrap()),
            rol: Set(rol),
            fecha_registro: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .unwrap();

        create_token(cedula, rol, SECRET, 1).unwrap()
    }

    pub async fn admin(&self) -> String {
        self.user("100000000", Rol::Administrador).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn vehiculo(&self, token: &str, placa: &str, propietario: Option<&str>) {
        let mut body = serde_json::json!({ "placa": placa, "marca": "Toyota", "modelo": "Corolla" });
        if let Some(cedula) = propietario {
            body["propietario_cedula"] = Value::String(cedula.to_string());
        }
        let (status, _) = self.post("/api/vehiculos", token, body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    /// Create a part and a priced line for it, returning the line id
    pub async fn reparacion(&self, admin: &str, repuesto_id: i32, precio: f64, cantidad: i32, mano_de_obra: f64) -> i64 {
        let (status, _) = self
            .post(
                "/api/repuestos",
                admin,
                serde_json::json!({ "id": repuesto_id, "nombre": format!("Repuesto {}", repuesto_id), "precio": precio }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/api/reparaciones",
                admin,
                serde_json::json!({ "repuesto_id": repuesto_id, "cantidad": cantidad, "mano_de_obra": mano_de_obra }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    pub async fn revision(&self, admin: &str, placa: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/revision",
                admin,
                serde_json::json!({ "placa": placa, "mecanico": "Luis", "detalle_averia": "Ruido en frenos" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }
}
