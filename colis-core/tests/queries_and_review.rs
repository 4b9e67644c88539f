//! Behaviour tests for mission listing, agency scoping, demand review and
//! the tracking read models.

mod support;

use anyhow::Result;
use colis_core::{
    AgencyScope, CoreError, CreateMission, MissionFilter, MissionLifecycleEngine,
};
use colis_model::{DemandStatus, DriverID, MissionStatus};
use sqlx::PgPool;

use support::*;

fn demand_request(demand_ids: Vec<colis_model::DemandID>) -> CreateMission {
    CreateMission {
        driver_id: DriverID::new(),
        demand_ids,
        parcel_ids: Vec::new(),
        shipper_id: None,
        agency: None,
        allow_partial: true,
    }
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn listing_is_scoped_filtered_and_paginated(pool: PgPool) -> Result<()> {
    let engine = MissionLifecycleEngine::new(pool.clone());

    for agency in ["Sousse", "Sousse", "Tunis"] {
        let (demand, _) = seed_accepted_demand_with_parcels(&pool, agency, 1).await;
        engine.create_mission(demand_request(vec![demand])).await?;
    }

    // Unscoped sees everything, newest first.
    let all = engine.list_missions(&MissionFilter::default()).await?;
    assert_eq!(all.total, 3);
    assert_eq!(all.missions.len(), 3);
    assert!(
        all.missions
            .windows(2)
            .all(|w| w[0].mission.created_at >= w[1].mission.created_at)
    );
    for summary in &all.missions {
        assert_eq!(summary.demand_count, 1);
        assert_eq!(summary.parcel_link_count, 1);
        // Listings are unprivileged.
        assert!(summary.mission.completion_code.is_none());
    }

    // Agency scoping is exact but case-insensitive.
    let scoped = engine
        .list_missions(&MissionFilter {
            scope: AgencyScope::scoped("SOUSSE"),
            ..Default::default()
        })
        .await?;
    assert_eq!(scoped.total, 2);
    assert!(scoped.missions.iter().all(|m| m.mission.agency == "Sousse"));

    // Status narrowing.
    let cancelled = engine
        .list_missions(&MissionFilter {
            status: Some(MissionStatus::Cancelled),
            ..Default::default()
        })
        .await?;
    assert_eq!(cancelled.total, 0);

    // Pagination.
    let page = engine
        .list_missions(&MissionFilter {
            page: 2,
            limit: 2,
            ..Default::default()
        })
        .await?;
    assert_eq!(page.total, 3);
    assert_eq!(page.missions.len(), 1);

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn scoped_operator_cannot_read_foreign_missions(pool: PgPool) -> Result<()> {
    let engine = MissionLifecycleEngine::new(pool.clone());
    let (demand, _) = seed_accepted_demand_with_parcels(&pool, "Sousse", 1).await;
    let created = engine.create_mission(demand_request(vec![demand])).await?;

    let detail = engine
        .get_mission(created.mission.id, &AgencyScope::scoped("sousse"))
        .await?;
    assert_eq!(detail.demands.len(), 1);
    assert_eq!(detail.parcels.len(), 1);

    let err = engine
        .get_mission(created.mission.id, &AgencyScope::scoped("Tunis"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn available_demands_excludes_claimed_and_unaccepted(pool: PgPool) -> Result<()> {
    let engine = MissionLifecycleEngine::new(pool.clone());
    let (claimed, _) = seed_accepted_demand_with_parcels(&pool, "Sousse", 1).await;
    let (free, _) = seed_accepted_demand_with_parcels(&pool, "Sousse", 1).await;
    seed_demand(&pool, "Sousse", "submitted").await;
    seed_demand(&pool, "Sousse", "rejected").await;

    engine.create_mission(demand_request(vec![claimed])).await?;

    let available = engine.available_demands().await?;
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, free);
    assert_eq!(available[0].status, DemandStatus::Accepted);

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn demand_review_moves_submitted_demands_only(pool: PgPool) -> Result<()> {
    let engine = MissionLifecycleEngine::new(pool.clone());
    let submitted = seed_demand(&pool, "Sousse", "submitted").await;

    let accepted = engine
        .review_demand(submitted, DemandStatus::Accepted)
        .await?;
    assert_eq!(accepted.status, DemandStatus::Accepted);

    // Re-reviewing an accepted demand is rejected.
    let err = engine
        .review_demand(submitted, DemandStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }));

    let err = engine
        .review_demand(colis_model::DemandID::new(), DemandStatus::Accepted)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn security_code_is_readable_and_verifies(pool: PgPool) -> Result<()> {
    let engine = MissionLifecycleEngine::new(pool.clone());
    let (demand, _) = seed_accepted_demand_with_parcels(&pool, "Sousse", 1).await;
    let created = engine.create_mission(demand_request(vec![demand])).await?;

    let code = engine.security_code(created.mission.id).await?;
    assert_eq!(Some(code.as_str()), created.mission.completion_code.as_deref());

    let err = engine
        .security_code(colis_model::MissionID::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    Ok(())
}

#[sqlx::test(migrator = "colis_core::MIGRATOR")]
async fn tracking_history_is_ordered_and_append_only(pool: PgPool) -> Result<()> {
    let engine = MissionLifecycleEngine::new(pool.clone());
    let (demand, parcels) = seed_accepted_demand_with_parcels(&pool, "Sousse", 1).await;
    let created = engine.create_mission(demand_request(vec![demand])).await?;
    let id = created.mission.id;

    engine.transition(id, MissionStatus::ToPickup, None).await?;
    engine.transition(id, MissionStatus::PickedUp, None).await?;

    let history = engine.parcel_history(parcels[0]).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, colis_model::ParcelStatus::ToPickup);
    assert_eq!(history[1].status, colis_model::ParcelStatus::PickedUp);
    assert_eq!(
        history[1].previous_status,
        Some(colis_model::ParcelStatus::ToPickup)
    );
    assert!(history[0].created_at <= history[1].created_at);

    let err = engine
        .parcel_history(colis_model::ParcelID::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    Ok(())
}
