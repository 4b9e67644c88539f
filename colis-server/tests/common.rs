//! Shared builders for the HTTP surface tests.
#![allow(dead_code)]

use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use colis_server::{AppState, Config, routes::create_api_router};

pub fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: String::new(),
        db_max_connections: 5,
        cors_allowed_origins: Vec::new(),
    }
}

pub fn build_test_server(pool: PgPool) -> TestServer {
    let state = AppState::new(pool, test_config());
    TestServer::new(create_api_router(state)).expect("test server")
}

pub async fn seed_warehouse(pool: &PgPool, name: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO warehouses (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .expect("seed warehouse");
    id
}

pub async fn seed_demand(pool: &PgPool, agency: &str, status: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO demands (id, shipper_id, agency, status) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(Uuid::now_v7())
        .bind(agency)
        .bind(status)
        .execute(pool)
        .await
        .expect("seed demand");
    id
}

pub async fn seed_parcel_for_demand(pool: &PgPool, demand: Uuid) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO parcels (id, tracking_code, status, shipper_id) VALUES ($1, $2, 'pending', $3)",
    )
    .bind(id)
    .bind(format!("TRK-{}", id.simple()))
    .bind(Uuid::now_v7())
    .execute(pool)
    .await
    .expect("seed parcel");

    sqlx::query("INSERT INTO demand_parcels (demand_id, parcel_id) VALUES ($1, $2)")
        .bind(demand)
        .bind(id)
        .execute(pool)
        .await
        .expect("link parcel");
    id
}
