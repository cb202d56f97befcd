//! Sample data for the demo tenant.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::resource::{validate_payload, ResourceRegistry, WriteMode};
use crate::store::{RecordStore, StoreError};

fn demo_records(resource: &str) -> Vec<Value> {
    match resource {
        "tasks" => vec![
            json!({"title": "Finalize brand guidelines", "status": "in_progress", "priority": "high", "estimated_minutes": 240, "tags": ["branding"]}),
            json!({"title": "Send invoice to Northwind", "status": "todo", "priority": "urgent", "category": "admin"}),
            json!({"title": "Client kickoff prep", "status": "completed", "priority": "medium", "category": "meeting", "actual_minutes": 45}),
            json!({"title": "Fix checkout bug", "status": "blocked", "priority": "high", "tags": ["web", "bug"]}),
        ],
        "deals" => vec![
            json!({"name": "Northwind website redesign", "value": 18000, "probability": 60, "priority": "high"}),
            json!({"name": "Contoso retainer renewal", "value": 4500, "probability": 90, "deal_type": "renewal"}),
            json!({"name": "Fabrikam brand refresh", "value": 9200, "status": "won", "probability": 100}),
        ],
        "contracts" => vec![
            json!({"title": "Northwind MSA", "client_name": "Northwind Traders", "status": "signed", "total_amount": 18000, "contract_type": "project"}),
            json!({"title": "Contoso monthly retainer", "client_name": "Contoso Ltd", "status": "active", "total_amount": 4500, "contract_type": "retainer"}),
        ],
        "meetings" => vec![
            json!({"title": "Weekly client sync", "scheduled_at": "2026-10-19T15:00:00Z", "duration_minutes": 45}),
            json!({"title": "Design review", "scheduled_at": "2026-10-21T10:30:00Z", "is_recorded": true}),
        ],
        "team" => vec![
            json!({"name": "Alex Rivera", "email": "alex@freeflow.io", "role": "owner", "status": "active", "department": "Leadership"}),
            json!({"name": "Jordan Lee", "email": "jordan@freeflow.io", "role": "member", "status": "active", "department": "Design", "skills": ["figma", "motion"]}),
            json!({"name": "Casey Morgan", "email": "casey@freeflow.io", "status": "invited", "department": "Engineering"}),
        ],
        "bookings" => vec![
            json!({"client_name": "Priya Patel", "start_time": "2026-10-20T09:00:00Z", "end_time": "2026-10-20T10:00:00Z", "status": "confirmed", "price": 150}),
            json!({"client_name": "Tom Becker", "start_time": "2026-10-22T14:00:00Z", "end_time": "2026-10-22T14:30:00Z"}),
        ],
        _ => Vec::new(),
    }
}

/// Insert the sample records for every registered resource under `owner`.
/// Returns the number of records written.
pub async fn seed_demo(store: &dyn RecordStore, registry: &ResourceRegistry, owner: Uuid) -> Result<usize, StoreError> {
    let mut seeded = 0;
    for schema in registry.iter() {
        for payload in demo_records(schema.name) {
            let record = validate_payload(schema, &payload, WriteMode::Create)
                .map_err(|e| StoreError::Query(format!("invalid {} fixture: {}", schema.name, e)))?;
            store.insert(schema, owner, record).await?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ListQuery;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn every_fixture_is_valid_and_owned_by_demo_user() {
        let store = MemoryStore::new();
        let registry = ResourceRegistry::builtin();
        let owner = crate::config::DEMO_USER_ID;

        let seeded = seed_demo(&store, &registry, owner).await.unwrap();
        assert_eq!(seeded, 16);

        for schema in registry.iter() {
            let page = store.list(schema, owner, &ListQuery::first_page(schema, 100)).await.unwrap();
            assert_eq!(page.total as usize, demo_records(schema.name).len(), "{}", schema.name);

            let other = store.list(schema, Uuid::new_v4(), &ListQuery::first_page(schema, 100)).await.unwrap();
            assert_eq!(other.total, 0);
        }
    }
}
