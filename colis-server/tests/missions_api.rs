//! End-to-end tests of the mission HTTP surface.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use common::*;

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn mission_flow_over_http(pool: PgPool) -> Result<()> {
    let server = build_test_server(pool.clone());
    seed_warehouse(&pool, "Entrepôt Sousse").await;
    let demand = seed_demand(&pool, "Sousse", "accepted").await;
    let parcel = seed_parcel_for_demand(&pool, demand).await;

    // Create.
    let response = server
        .post("/api/v1/missions")
        .json(&json!({
            "driver_id": Uuid::now_v7(),
            "demand_ids": [demand],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let mission_id = body["id"].as_str().expect("mission id").to_string();
    let completion_code = body["completion_code"]
        .as_str()
        .expect("completion code in create response")
        .to_string();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["claimed"].as_array().map(Vec::len), Some(1));

    // The privileged endpoint returns the same code.
    let response = server
        .get(&format!("/api/v1/missions/{mission_id}/security-code"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["code"].as_str(), Some(completion_code.as_str()));

    // Drive the mission forward.
    for status in ["to_pickup", "picked_up"] {
        let response = server
            .put(&format!("/api/v1/missions/{mission_id}"))
            .json(&json!({ "status": status }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], status);
        assert_eq!(body["updated_parcels"], 1);
    }

    // Wrong code is rejected with no state change.
    let response = server
        .put(&format!("/api/v1/missions/{mission_id}"))
        .json(&json!({ "status": "at_warehouse", "code": "WRONG" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "code_mismatch");

    // Correct code completes the mission and resolves the warehouse.
    let response = server
        .put(&format!("/api/v1/missions/{mission_id}"))
        .json(&json!({ "status": "at_warehouse", "code": completion_code }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "at_warehouse");
    assert_eq!(body["unresolved_agency"], false);
    assert_eq!(body["parcels"][0]["status"], "at_warehouse");

    // The parcel trail is readable.
    let response = server.get(&format!("/api/v1/parcels/{parcel}/history")).await;
    response.assert_status_ok();
    let history: Value = response.json();
    assert_eq!(history.as_array().map(Vec::len), Some(3));
    assert_eq!(history[0]["previous_status"], "pending");

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn listing_honours_agency_scope_header(pool: PgPool) -> Result<()> {
    let server = build_test_server(pool.clone());

    for agency in ["Sousse", "Tunis"] {
        let demand = seed_demand(&pool, agency, "accepted").await;
        seed_parcel_for_demand(&pool, demand).await;
        let response = server
            .post("/api/v1/missions")
            .json(&json!({
                "driver_id": Uuid::now_v7(),
                "demand_ids": [demand],
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let response = server.get("/api/v1/missions").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 2);
    // Listings never expose the completion code.
    assert_eq!(body["missions"][0]["completion_code"], Value::Null);

    let response = server
        .get("/api/v1/missions")
        .add_header("x-agency-scope", "sousse")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["missions"][0]["agency"], "Sousse");

    // A scoped operator cannot fetch a foreign mission.
    let foreign_id = body["missions"][0]["id"].as_str().unwrap().to_string();
    let response = server
        .get(&format!("/api/v1/missions/{foreign_id}"))
        .add_header("x-agency-scope", "Tunis")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn demand_review_and_available_demands(pool: PgPool) -> Result<()> {
    let server = build_test_server(pool.clone());
    let demand = seed_demand(&pool, "Sfax", "submitted").await;

    // Not claimable while submitted.
    let response = server.get("/api/v1/missions/available-demands").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let response = server
        .put(&format!("/api/v1/demands/{demand}"))
        .json(&json!({ "status": "accepted" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "accepted");

    let response = server.get("/api/v1/missions/available-demands").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    // Re-reviewing conflicts.
    let response = server
        .put(&format!("/api/v1/demands/{demand}"))
        .json(&json!({ "status": "rejected" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "invalid_transition");

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn creation_with_no_claimable_demand_conflicts(pool: PgPool) -> Result<()> {
    let server = build_test_server(pool.clone());
    let demand = seed_demand(&pool, "Sousse", "accepted").await;
    seed_parcel_for_demand(&pool, demand).await;

    let create = |ids: Vec<Uuid>| {
        json!({
            "driver_id": Uuid::now_v7(),
            "demand_ids": ids,
        })
    };

    server
        .post("/api/v1/missions")
        .json(&create(vec![demand]))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/missions")
        .json(&create(vec![demand]))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "no_demands_claimed");
    assert_eq!(body["error"]["detail"][0]["reason"], "already_assigned");

    // Unknown mission ids surface as not_found.
    let response = server
        .put(&format!("/api/v1/missions/{}", Uuid::now_v7()))
        .json(&json!({ "status": "to_pickup" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    Ok(())
}
