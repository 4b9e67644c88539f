//! Seed helpers shared by the engine behaviour tests.
#![allow(dead_code)]

use colis_model::{DemandID, ParcelID, WarehouseID};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn seed_warehouse(pool: &PgPool, name: &str) -> WarehouseID {
    let id = WarehouseID::new();
    sqlx::query("INSERT INTO warehouses (id, name) VALUES ($1, $2)")
        .bind(id.to_uuid())
        .bind(name)
        .execute(pool)
        .await
        .expect("seed warehouse");
    id
}

pub async fn seed_demand(pool: &PgPool, agency: &str, status: &str) -> DemandID {
    let id = DemandID::new();
    sqlx::query("INSERT INTO demands (id, shipper_id, agency, status) VALUES ($1, $2, $3, $4)")
        .bind(id.to_uuid())
        .bind(Uuid::now_v7())
        .bind(agency)
        .bind(status)
        .execute(pool)
        .await
        .expect("seed demand");
    id
}

pub async fn seed_parcel(pool: &PgPool, status: &str) -> ParcelID {
    let id = ParcelID::new();
    sqlx::query(
        "INSERT INTO parcels (id, tracking_code, status, shipper_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(id.to_uuid())
    .bind(format!("TRK-{}", id.to_uuid().simple()))
    .bind(status)
    .bind(Uuid::now_v7())
    .execute(pool)
    .await
    .expect("seed parcel");
    id
}

pub async fn link_demand_parcel(pool: &PgPool, demand: DemandID, parcel: ParcelID) {
    sqlx::query("INSERT INTO demand_parcels (demand_id, parcel_id) VALUES ($1, $2)")
        .bind(demand.to_uuid())
        .bind(parcel.to_uuid())
        .execute(pool)
        .await
        .expect("link demand parcel");
}

/// An accepted demand with `parcels` pending parcels attached.
pub async fn seed_accepted_demand_with_parcels(
    pool: &PgPool,
    agency: &str,
    parcels: usize,
) -> (DemandID, Vec<ParcelID>) {
    let demand = seed_demand(pool, agency, "accepted").await;
    let mut ids = Vec::with_capacity(parcels);
    for _ in 0..parcels {
        let parcel = seed_parcel(pool, "pending").await;
        link_demand_parcel(pool, demand, parcel).await;
        ids.push(parcel);
    }
    (demand, ids)
}

pub async fn parcel_status(pool: &PgPool, parcel: ParcelID) -> String {
    sqlx::query_scalar("SELECT status FROM parcels WHERE id = $1")
        .bind(parcel.to_uuid())
        .fetch_one(pool)
        .await
        .expect("parcel status")
}

pub async fn mission_status(pool: &PgPool, mission: colis_model::MissionID) -> String {
    sqlx::query_scalar("SELECT status FROM missions WHERE id = $1")
        .bind(mission.to_uuid())
        .fetch_one(pool)
        .await
        .expect("mission status")
}

pub async fn history_count(pool: &PgPool, parcel: ParcelID) -> i64 {
    sqlx::query_scalar("SELECT count(*) FROM tracking_history WHERE parcel_id = $1")
        .bind(parcel.to_uuid())
        .fetch_one(pool)
        .await
        .expect("history count")
}
