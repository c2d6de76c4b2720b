mod common;

use axum::http::{Method, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde_json::{json, Value};

use common::{setup, TestApp};
use taller_backend::entities::informe::{self, EstadoFactura};
use taller_backend::entities::revision::{self, EstadoRevision};
use taller_backend::entities::usuario::Rol;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0, 0, 13];

struct Taller {
    app: TestApp,
    admin: String,
    ana: String,
    beto: String,
}

async fn taller() -> Taller {
    let app = setup().await;
    let admin = app.admin().await;
    let ana = app.user("2-0202-0202", Rol::Cliente).await;
    let beto = app.user("3-0303-0303", Rol::Cliente).await;
    app.vehiculo(&ana, "ANA001", None).await;
    app.vehiculo(&beto, "BET001", None).await;
    Taller { app, admin, ana, beto }
}

async fn decide(t: &Taller, id: i64, token: &str, estado: &str) {
    let (status, _) = t
        .app
        .request(
            Method::PATCH,
            &format!("/api/revision/{}", id),
            Some(token),
            Some(json!({ "estado": estado })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

async fn attach(t: &Taller, revision: i64, linea: i64) {
    let (status, _) = t
        .app
        .post(
            &format!("/api/revision/{}/repuestos", revision),
            &t.admin,
            json!({ "precio_reparacion_id": linea }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn informe(t: &Taller, placa: &str) -> Value {
    let (status, body) = t
        .app
        .post(
            "/api/informes",
            &t.admin,
            json!({ "placa": placa, "detalle_informe": "Trabajo terminado" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn estado(t: &Taller, id: i64, token: &str, body: Value) -> (StatusCode, Value) {
    t.app
        .request(Method::PUT, &format!("/api/informes/{}/estado", id), Some(token), Some(body))
        .await
}

#[tokio::test]
async fn informe_delivers_repairing_revisions_only() {
    let t = taller().await;
    let filtro = t.app.reparacion(&t.admin, 1, 10.0, 2, 5.0).await;
    let aceite = t.app.reparacion(&t.admin, 2, 30.0, 1, 0.0).await;

    let aprobada = t.app.revision(&t.admin, "ANA001").await;
    attach(&t, aprobada, filtro).await;
    attach(&t, aprobada, aceite).await;
    decide(&t, aprobada, &t.ana, "reparacion").await;

    let rechazada = t.app.revision(&t.admin, "ANA001").await;
    attach(&t, rechazada, aceite).await;
    decide(&t, rechazada, &t.ana, "cancelado").await;

    let pendiente = t.app.revision(&t.admin, "ANA001").await;

    let ajena = t.app.revision(&t.admin, "BET001").await;
    decide(&t, ajena, &t.beto, "reparacion").await;

    let body = informe(&t, "ANA001").await;
    assert_eq!(body["revisiones_entregadas"], json!([aprobada]));
    assert_eq!(body["informe"]["estado_factura"], "pendiente");
    assert_eq!(body["informe"]["total_general"], 55.0);
    assert_eq!(body["informe"]["firmado"], false);

    for (id, expected) in [
        (aprobada, "entrega"),
        (rechazada, "cancelado"),
        (pendiente, "en_espera"),
        (ajena, "reparacion"),
    ] {
        let (_, revision) = t.app.get(&format!("/api/revision/{}", id), &t.admin).await;
        assert_eq!(revision["estado"], expected, "revision {}", id);
    }

    // A second informe finds nothing left to deliver
    let body = informe(&t, "ANA001").await;
    assert_eq!(body["revisiones_entregadas"], json!([]));
    assert_eq!(body["informe"]["total_general"], 0.0);
}

#[tokio::test]
async fn informe_creation_rules() {
    let t = taller().await;

    let (status, _) = t
        .app
        .post("/api/informes", &t.ana, json!({ "placa": "ANA001", "detalle_informe": "x" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
        .app
        .post("/api/informes", &t.admin, json!({ "placa": "NOEXISTE", "detalle_informe": "x" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .app
        .post("/api/informes", &t.admin, json!({ "placa": "ANA001" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t.app.get("/api/informes", &t.ana).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn paying_requires_a_signature() {
    let t = taller().await;
    let id = informe(&t, "ANA001").await["informe"]["id"].as_i64().unwrap();

    let (status, body) = estado(&t, id, &t.ana, json!({ "estado_factura": "pagado" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "La firma es requerida para pagar la factura.");

    let (_, body) = t.app.get(&format!("/api/informes/{}", id), &t.ana).await;
    assert_eq!(body["estado_factura"], "pendiente");

    let (status, _) = estado(&t, id, &t.ana, json!({ "estado_factura": "regalado" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let firma = format!("data:image/png;base64,{}", STANDARD.encode(PNG));
    let (status, _) = estado(
        &t,
        id,
        &t.beto,
        json!({ "estado_factura": "pagado", "signature": firma }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = estado(
        &t,
        id,
        &t.ana,
        json!({ "estado_factura": "pagado", "signature": firma }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estado_factura"], "pagado");
    assert_eq!(body["firmado"], true);
    assert!(body.get("signature").is_none());

    let stored = informe::Entity::find_by_id(id as i32)
        .one(&t.app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.signature.as_deref(), Some(PNG));

    // Paid is terminal
    let (status, _) = estado(
        &t,
        id,
        &t.ana,
        json!({ "estado_factura": "pagado", "signature": STANDARD.encode(PNG) }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = estado(&t, id, &t.admin, json!({ "estado_factura": "pendiente" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The terminal state is reported before the signature is looked at
    let (status, _) = estado(&t, id, &t.ana, json!({ "estado_factura": "pagado" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn informe_reads_are_owner_or_admin() {
    let t = taller().await;
    let id = informe(&t, "ANA001").await["informe"]["id"].as_i64().unwrap();
    informe(&t, "BET001").await;

    let (status, _) = t.app.get(&format!("/api/informes/{}", id), &t.ana).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t.app.get(&format!("/api/informes/{}", id), &t.beto).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = t.app.get("/api/informes/9999", &t.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Informe no encontrado");

    let (status, body) = t.app.get("/api/informes", &t.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

async fn back_dated_informe(t: &Taller, placa: &str, days: i64) -> i64 {
    let informe = informe::ActiveModel {
        placa: Set(placa.to_string()),
        detalle_informe: Set("Servicio anterior".to_string()),
        estado_factura: Set(EstadoFactura::Pendiente),
        signature: Set(None),
        total_general: Set(80.0),
        fecha: Set((Utc::now() - Duration::days(days)).into()),
        ..Default::default()
    }
    .insert(&t.app.db)
    .await
    .unwrap();

    i64::from(informe.id)
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn informes_cliente_is_scoped_to_own_vehicles() {
    let t = taller().await;
    let reciente = informe(&t, "ANA001").await["informe"]["id"].as_i64().unwrap();
    informe(&t, "BET001").await;
    let viejo = back_dated_informe(&t, "ANA001", 40).await;

    let (status, body) = t.app.get("/api/informes-cliente", &t.ana).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![reciente, viejo]);

    // Admins only see informes for their own vehicles here
    let (_, body) = t.app.get("/api/informes-cliente", &t.admin).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn admin_informes_filter_by_rango() {
    let t = taller().await;
    let hoy = informe(&t, "ANA001").await["informe"]["id"].as_i64().unwrap();
    let hace_diez = back_dated_informe(&t, "BET001", 10).await;
    let hace_veinte = back_dated_informe(&t, "ANA001", 20).await;
    let hace_cuarenta = back_dated_informe(&t, "BET001", 40).await;

    let (status, body) = t.app.get("/api/informes", &t.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![hoy, hace_diez, hace_veinte, hace_cuarenta]);

    for (rango, expected) in [
        ("siempre", vec![hoy, hace_diez, hace_veinte, hace_cuarenta]),
        ("semana", vec![hoy]),
        ("2semanas", vec![hoy, hace_diez]),
        ("3semanas", vec![hoy, hace_diez, hace_veinte]),
        ("mes", vec![hoy, hace_diez, hace_veinte]),
    ] {
        let (status, body) = t
            .app
            .get(&format!("/api/informes?rango={}", rango), &t.admin)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), expected, "rango {}", rango);
    }

    let (status, _) = t.app.get("/api/informes?rango=ayer", &t.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn informe_generation_rolls_back_on_failure() {
    let t = taller().await;
    let linea = t.app.reparacion(&t.admin, 1, 10.0, 1, 0.0).await;
    let id = t.app.revision(&t.admin, "ANA001").await;
    attach(&t, id, linea).await;
    decide(&t, id, &t.ana, "reparacion").await;

    // Make the delivery step fail after the informe row is inserted
    t.app
        .db
        .execute_unprepared(
            "CREATE TRIGGER bloquear_entrega BEFORE UPDATE ON revision \
             WHEN NEW.estado = 'entrega' \
             BEGIN SELECT RAISE(ABORT, 'entrega bloqueada'); END;",
        )
        .await
        .unwrap();

    let (status, body) = t
        .app
        .post(
            "/api/informes",
            &t.admin,
            json!({ "placa": "ANA001", "detalle_informe": "Trabajo terminado" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error en el servidor");

    assert!(informe::Entity::find().all(&t.app.db).await.unwrap().is_empty());

    let stored = revision::Entity::find_by_id(id as i32)
        .one(&t.app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.estado, EstadoRevision::Reparacion);
}
