mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{setup, setup_with, test_config, PASSWORD};
use taller_backend::entities::usuario::Rol;

fn registro(cedula: &str, correo: &str) -> serde_json::Value {
    json!({
        "cedula": cedula,
        "nombre": "Ana Mora",
        "telefono": "70000000",
        "correo": correo,
        "contrasena": "una-clave",
    })
}

#[tokio::test]
async fn register_creates_cliente_without_exposing_hash() {
    let app = setup().await;

    let (status, body) = app
        .request(Method::POST, "/api/register", None, Some(registro("1-0001-0001", "ana@correo.test")))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["usuario"]["cedula"], "1-0001-0001");
    assert_eq!(body["usuario"]["rol"], "cliente");
    assert!(body["usuario"].get("contrasena_hash").is_none());
}

#[tokio::test]
async fn register_rejects_duplicates_and_missing_fields() {
    let app = setup().await;
    app.request(Method::POST, "/api/register", None, Some(registro("1-0001-0001", "ana@correo.test")))
        .await;

    // Same cedula, different correo
    let (status, body) = app
        .request(Method::POST, "/api/register", None, Some(registro("1-0001-0001", "otra@correo.test")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cédula o correo ya registrados");

    // Same correo, different cedula
    let (status, _) = app
        .request(Method::POST, "/api/register", None, Some(registro("2-0002-0002", "ana@correo.test")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(Method::POST, "/api/register", None, Some(json!({ "cedula": "3" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("correo"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = setup().await;
    let admin = app.admin().await;

    let (status, body) = app
        .request(Method::POST, "/api/vehiculos", Some(&admin), Some(json!("no es un objeto")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = setup().await;
    app.user("5-0505-0505", Rol::Cliente).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "cedula": "5-0505-0505", "contrasena": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usuario"]["rol"], "cliente");
    let token = body["token"].as_str().unwrap();

    let (status, _) = app.get("/api/vehiculos", token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures() {
    let app = setup().await;
    app.user("5-0505-0505", Rol::Cliente).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "cedula": "5-0505-0505", "contrasena": "incorrecta" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Cédula o contraseña incorrectas");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "cedula": "9-9999-9999", "contrasena": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(Method::POST, "/api/login", None, Some(json!({ "cedula": "5-0505-0505" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cédula y contraseña requeridos");
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = setup().await;

    let (status, body) = app.request(Method::GET, "/api/vehiculos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token requerido");

    let (status, body) = app.get("/api/vehiculos", "no.es.un-token").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Token inválido");
}

#[tokio::test]
async fn missing_secret_is_a_server_error() {
    let app = setup_with(test_config(None)).await;
    let token = app.user("5-0505-0505", Rol::Cliente).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "cedula": "5-0505-0505", "contrasena": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Error de configuración del servidor (JWT_SECRET no definida)."
    );

    let (status, _) = app.get("/api/vehiculos", &token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn usuarios_is_admin_only() {
    let app = setup().await;
    let admin = app.admin().await;
    let cliente = app.user("2-0202-0202", Rol::Cliente).await;

    let (status, body) = app.get("/api/usuarios", &cliente).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "No autorizado");

    let (status, body) = app.get("/api/usuarios", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let usuarios = body.as_array().unwrap();
    assert_eq!(usuarios.len(), 2);
    assert!(usuarios.iter().all(|u| u.get("cedula").is_some() && u.get("nombre").is_some()));
}
