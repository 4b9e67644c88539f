//! Agency-to-warehouse resolution.
//!
//! A warehouse is keyed by its name, which must match the shipper's agency
//! string. When no exact match exists the legacy substring fallback applies:
//! the agency contains, or is contained by, the warehouse name
//! (case-insensitive). The policy lives in [`match_warehouse`] so an explicit
//! agency→warehouse mapping table can replace it without touching callers.

use sqlx::PgConnection;
use tracing::warn;
use uuid::Uuid;

use colis_model::{Warehouse, WarehouseID};

use crate::error::Result;
use crate::rows::WarehouseRow;

/// Resolves a shipper's agency string to a physical depot and assigns the
/// depot to parcels.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarehouseResolver;

/// Apply the matching policy to a candidate list.
///
/// Exact name equality wins. Otherwise the substring fallback picks the
/// candidate with the shortest name among those where one string contains
/// the other, so `"Sousse"` resolves to `"Entrepôt Sousse"` even when a
/// vaguer match also exists.
pub fn match_warehouse<'a>(agency: &str, candidates: &'a [Warehouse]) -> Option<&'a Warehouse> {
    if let Some(exact) = candidates.iter().find(|w| w.name == agency) {
        return Some(exact);
    }

    let agency_lower = agency.to_lowercase();
    candidates
        .iter()
        .filter(|w| {
            let name_lower = w.name.to_lowercase();
            name_lower.contains(&agency_lower) || agency_lower.contains(&name_lower)
        })
        .min_by_key(|w| w.name.len())
}

impl WarehouseResolver {
    /// Resolve `agency` to a warehouse, or `None` when nothing matches.
    ///
    /// The warehouse table is small, so candidates are loaded in full and
    /// the policy applied in one place.
    pub async fn resolve(
        &self,
        conn: &mut PgConnection,
        agency: &str,
    ) -> Result<Option<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, created_at FROM warehouses ORDER BY name",
        )
        .fetch_all(&mut *conn)
        .await?;

        let candidates: Vec<Warehouse> =
            rows.into_iter().map(WarehouseRow::into_warehouse).collect();

        Ok(match_warehouse(agency, &candidates).cloned())
    }

    /// Assign `warehouse` to every listed parcel whose reference differs.
    ///
    /// Idempotent: re-assigning an already-correct reference is a no-op.
    pub async fn assign_parcels(
        &self,
        conn: &mut PgConnection,
        parcel_ids: &[Uuid],
        warehouse: WarehouseID,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE parcels
            SET warehouse_id = $2
            WHERE id = ANY($1)
              AND warehouse_id IS DISTINCT FROM $2
            "#,
        )
        .bind(parcel_ids)
        .bind(warehouse.to_uuid())
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Resolve `agency` and assign the result to the listed parcels.
    ///
    /// An unresolved agency is a soft failure: it is logged as a warning and
    /// the parcels keep a null warehouse reference rather than blocking the
    /// pickup flow.
    pub async fn assign_parcels_for_agency(
        &self,
        conn: &mut PgConnection,
        parcel_ids: &[Uuid],
        agency: &str,
    ) -> Result<Option<WarehouseID>> {
        match self.resolve(&mut *conn, agency).await? {
            Some(warehouse) => {
                self.assign_parcels(conn, parcel_ids, warehouse.id).await?;
                Ok(Some(warehouse.id))
            }
            None => {
                warn!(agency, "no warehouse matches agency; parcels keep null warehouse");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn warehouse(name: &str) -> Warehouse {
        Warehouse {
            id: WarehouseID::new(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn exact_match_wins() {
        let candidates = vec![warehouse("Entrepôt Sousse"), warehouse("Sousse")];
        let found = match_warehouse("Sousse", &candidates).unwrap();
        assert_eq!(found.name, "Sousse");
    }

    #[test]
    fn substring_fallback_resolves_agency_inside_name() {
        let candidates = vec![warehouse("Entrepôt Sousse"), warehouse("Entrepôt Tunis")];
        let found = match_warehouse("Sousse", &candidates).unwrap();
        assert_eq!(found.name, "Entrepôt Sousse");
    }

    #[test]
    fn substring_fallback_resolves_name_inside_agency() {
        let candidates = vec![warehouse("Sfax")];
        let found = match_warehouse("Agence Sfax Sud", &candidates).unwrap();
        assert_eq!(found.name, "Sfax");
    }

    #[test]
    fn fallback_is_case_insensitive() {
        let candidates = vec![warehouse("Entrepôt Sousse")];
        assert!(match_warehouse("SOUSSE", &candidates).is_some());
    }

    #[test]
    fn ambiguous_fallback_prefers_tightest_name() {
        let candidates = vec![
            warehouse("Entrepôt Sousse Nord Annexe"),
            warehouse("Entrepôt Sousse"),
        ];
        let found = match_warehouse("Sousse", &candidates).unwrap();
        assert_eq!(found.name, "Entrepôt Sousse");
    }

    #[test]
    fn unknown_agency_resolves_to_none() {
        let candidates = vec![warehouse("Entrepôt Sousse")];
        assert!(match_warehouse("Bizerte", &candidates).is_none());
    }
}
