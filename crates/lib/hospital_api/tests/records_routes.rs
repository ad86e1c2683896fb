//! Doctor, specialty, medication and patient routes.

mod common;

use axum::http::{Method, StatusCode};
use common::{app, app_with_policy, register, send};
use hospital_api::config::RecordAccessPolicy;
use hospital_core::models::auth::Role;
use serde_json::{Value, json};

fn doctor(name: &str, license: &str) -> Value {
    json!({
        "name": name,
        "lastName": "Doe",
        "specialty": "Cardiology",
        "phone": "1234567890",
        "email": "doctor@hospital.com",
        "licenseNumber": license,
    })
}

#[tokio::test]
async fn doctor_crud_round() {
    let (app, _) = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/doctores",
        None,
        Some(doctor("Carlos", "LIC-1")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["licenseNumber"], "LIC-1");

    let (status, list) = send(&app, Method::GET, "/api/doctores", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/api/doctores/{id}");
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        None,
        Some(json!({ "phone": "0999999999" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "0999999999");
    assert_eq!(updated["name"], "Carlos");

    let (status, deleted) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Doctor deleted successfully");
    assert_eq!(deleted["deleted"]["id"], id.as_str());

    let (status, json) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Doctor not found");
}

#[tokio::test]
async fn doctor_license_conflicts() {
    let (app, _) = app();
    let (_, first) = send(&app, Method::POST, "/api/doctores", None, Some(doctor("A", "LIC-001"))).await;
    let (_, second) = send(&app, Method::POST, "/api/doctores", None, Some(doctor("B", "LIC-002"))).await;

    let (status, json) = send(&app, Method::POST, "/api/doctores", None, Some(doctor("C", "LIC-001"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "A doctor with this license number already exists");

    let own = format!("/api/doctores/{}", first["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        Method::PUT,
        &own,
        None,
        Some(json!({ "licenseNumber": "LIC-001", "name": "A2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let other = format!("/api/doctores/{}", second["id"].as_str().unwrap());
    let (status, _) = send(
        &app,
        Method::PUT,
        &other,
        None,
        Some(json!({ "licenseNumber": "LIC-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn doctor_missing_fields_message() {
    let (app, _) = app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/doctores",
        None,
        Some(json!({ "name": "Only" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "Name, Last Name, Specialty, Phone, Email and License Number are required"
    );
    assert!(json.get("success").is_none());
}

#[tokio::test]
async fn specialty_names_are_unique_ignoring_case() {
    let (app, _) = app();
    let create = |name: &'static str| {
        let app = app.clone();
        async move {
            send(
                &app,
                Method::POST,
                "/api/especialidades",
                None,
                Some(json!({ "name": name })),
            )
            .await
        }
    };

    assert_eq!(create("Cardiology").await.0, StatusCode::CREATED);
    let (status, json) = create("CARDIOLOGY").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Specialty already exists");
    assert_eq!(create("Pediatrics").await.0, StatusCode::CREATED);

    let (status, json) = create("   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Specialty name is required");
}

#[tokio::test]
async fn medication_rejects_negative_stock() {
    let (app, _) = app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/medicamentos",
        None,
        Some(json!({
            "name": "Aspirin",
            "description": "Pain relief",
            "price": 2.5,
            "quantity": -1,
            "category": "Analgesics",
            "laboratory": "Bayer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Quantity must be a non-negative integer");

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/medicamentos",
        None,
        Some(json!({
            "name": "Aspirin",
            "description": "Pain relief",
            "price": 2.5,
            "quantity": 10,
            "category": "Analgesics",
            "laboratory": "Bayer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["price"], 2.5);
    assert_eq!(created["quantity"], 10);
}

#[tokio::test]
async fn patient_update_and_not_found() {
    let (app, _) = app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/pacientes",
        None,
        Some(json!({
            "name": "Juan",
            "lastName": "Pérez",
            "email": "juan@test.com",
            "gender": "Male",
            "illness": "Flu",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/pacientes/{}", created["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        None,
        Some(json!({ "illness": "Migraine" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["illness"], "Migraine");
    assert_eq!(updated["lastName"], "Pérez");

    let (status, json) = send(
        &app,
        Method::DELETE,
        "/api/pacientes/507f1f77bcf86cd799439011",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Patient not found");
}

#[tokio::test]
async fn authenticated_policy_requires_a_token() {
    let (app, _) = app_with_policy(RecordAccessPolicy::Authenticated);

    let (status, json) = send(&app, Method::GET, "/api/pacientes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "missing_token");

    let token = register(&app, "p@x.com", None).await;
    let (status, json) = send(&app, Method::GET, "/api/pacientes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn role_policy_admits_only_listed_roles() {
    let (app, _) = app_with_policy(RecordAccessPolicy::Roles(vec![Role::Admin, Role::Doctor]));
    let patient = register(&app, "p@x.com", None).await;
    let doctor_token = register(&app, "d@x.com", Some("doctor")).await;

    let (status, _) = send(&app, Method::GET, "/api/medicamentos", Some(&patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/api/medicamentos", Some(&doctor_token), None).await;
    assert_eq!(status, StatusCode::OK);
}
