use std::collections::BTreeMap;

use serde_json::json;

use super::schema::{FieldSpec, ResourceSchema, SortOrder};

const PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

/// Resources reachable under `/api/data/:resource`
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, ResourceSchema>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in business resource
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in [tasks(), deals(), contracts(), meetings(), team(), bookings()] {
            registry.register(schema);
        }
        registry
    }

    pub fn register(&mut self, schema: ResourceSchema) {
        self.resources.insert(schema.name, schema);
    }

    pub fn get(&self, name: &str) -> Option<&ResourceSchema> {
        self.resources.get(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceSchema> {
        self.resources.values()
    }
}

fn tasks() -> ResourceSchema {
    ResourceSchema::new("tasks", "tasks")
        .field(FieldSpec::text("title").required().length(1, 255).searchable().sortable())
        .field(FieldSpec::text("description").max_len(5000).searchable())
        .field(
            FieldSpec::enumeration("status", &["todo", "in_progress", "review", "completed", "cancelled", "blocked"])
                .default_value(json!("todo"))
                .not_null()
                .filterable()
                .sortable(),
        )
        .field(
            FieldSpec::enumeration("priority", PRIORITIES)
                .default_value(json!("medium"))
                .not_null()
                .filterable()
                .sortable(),
        )
        .field(
            FieldSpec::enumeration("category", &["work", "personal", "meeting", "break", "admin", "creative"])
                .default_value(json!("work"))
                .filterable(),
        )
        .field(FieldSpec::uuid("project_id").filterable())
        .field(FieldSpec::uuid("assignee_id").filterable())
        .field(FieldSpec::integer("estimated_minutes").range(0.0, 100_000.0))
        .field(FieldSpec::integer("actual_minutes").range(0.0, 100_000.0))
        .field(FieldSpec::timestamp("due_date").sortable())
        .field(FieldSpec::integer("position").default_value(json!(0)).sortable())
        .field(FieldSpec::tags("tags").max_len(50))
        .status_field("status")
        .default_sort("created_at", SortOrder::Asc)
}

fn deals() -> ResourceSchema {
    ResourceSchema::new("deals", "crm_deals")
        .field(FieldSpec::text("name").required().length(1, 255).searchable().sortable())
        .field(FieldSpec::text("description").max_len(5000).searchable())
        .field(FieldSpec::uuid("pipeline_id").filterable())
        .field(FieldSpec::uuid("stage_id").filterable())
        .field(FieldSpec::uuid("company_id").filterable())
        .field(FieldSpec::uuid("contact_id").filterable())
        .field(FieldSpec::number("value").at_least(0.0).default_value(json!(0)).not_null().sortable())
        .field(FieldSpec::text("currency").length(3, 3).default_value(json!("USD")).not_null())
        .field(FieldSpec::number("probability").range(0.0, 100.0).sortable())
        .field(
            FieldSpec::enumeration("status", &["open", "won", "lost", "abandoned", "on_hold"])
                .default_value(json!("open"))
                .not_null()
                .filterable(),
        )
        .field(
            FieldSpec::enumeration("priority", PRIORITIES)
                .default_value(json!("medium"))
                .not_null()
                .filterable(),
        )
        .field(
            FieldSpec::enumeration(
                "deal_type",
                &["new_business", "existing_business", "renewal", "upsell", "cross_sell", "other"],
            )
            .default_value(json!("new_business"))
            .not_null()
            .filterable(),
        )
        .field(FieldSpec::timestamp("expected_close_date").sortable())
        .field(FieldSpec::text("lead_source").max_len(100).filterable())
        .field(FieldSpec::tags("tags").max_len(50))
        .field(FieldSpec::json("custom_fields"))
        .status_field("status")
        .default_sort("updated_at", SortOrder::Desc)
}

fn contracts() -> ResourceSchema {
    ResourceSchema::new("contracts", "contracts")
        .field(FieldSpec::text("title").required().length(1, 255).searchable().sortable())
        .field(FieldSpec::text("client_name").max_len(255).searchable().sortable())
        .field(FieldSpec::text("client_email").max_len(255))
        .field(
            FieldSpec::enumeration("status", &["draft", "sent", "viewed", "signed", "active", "completed", "cancelled", "expired"])
                .default_value(json!("draft"))
                .not_null()
                .filterable(),
        )
        .field(
            FieldSpec::enumeration("contract_type", &["service", "project", "retainer", "nda", "other"])
                .default_value(json!("service"))
                .filterable(),
        )
        .field(FieldSpec::number("total_amount").at_least(0.0).sortable())
        .field(FieldSpec::text("currency").length(3, 3).default_value(json!("USD")).not_null())
        .field(FieldSpec::timestamp("start_date").sortable())
        .field(FieldSpec::timestamp("end_date").sortable())
        .field(FieldSpec::text("terms").max_len(50_000))
        .field(FieldSpec::tags("tags").max_len(50))
        .status_field("status")
}

fn meetings() -> ResourceSchema {
    ResourceSchema::new("meetings", "meetings")
        .field(FieldSpec::text("title").required().length(1, 255).searchable().sortable())
        .field(FieldSpec::text("description").max_len(5000).searchable())
        .field(FieldSpec::timestamp("scheduled_at").required().sortable())
        .field(FieldSpec::integer("duration_minutes").range(1.0, 1440.0).default_value(json!(30)).not_null())
        .field(
            FieldSpec::enumeration("status", &["scheduled", "live", "completed", "cancelled"])
                .default_value(json!("scheduled"))
                .not_null()
                .filterable(),
        )
        .field(
            FieldSpec::enumeration("meeting_type", &["video", "audio", "in_person", "screen_share"])
                .default_value(json!("video"))
                .filterable(),
        )
        .field(FieldSpec::text("location").max_len(500))
        .field(FieldSpec::boolean("is_recorded").default_value(json!(false)).not_null().filterable())
        .status_field("status")
        .default_sort("scheduled_at", SortOrder::Asc)
}

fn team() -> ResourceSchema {
    ResourceSchema::new("team", "team_members")
        .owner_column("owner_id")
        .field(FieldSpec::text("name").required().length(1, 255).searchable().sortable())
        .field(FieldSpec::text("email").required().length(3, 255).searchable())
        .field(
            FieldSpec::enumeration("role", &["owner", "admin", "manager", "member", "viewer"])
                .default_value(json!("member"))
                .not_null()
                .filterable(),
        )
        .field(FieldSpec::text("department").max_len(100).filterable().sortable())
        .field(
            FieldSpec::enumeration("status", &["active", "invited", "inactive"])
                .default_value(json!("invited"))
                .not_null()
                .filterable(),
        )
        .field(FieldSpec::number("hourly_rate").at_least(0.0))
        .field(FieldSpec::tags("skills").max_len(50))
        .status_field("status")
        .default_sort("name", SortOrder::Asc)
}

fn bookings() -> ResourceSchema {
    ResourceSchema::new("bookings", "bookings")
        .field(FieldSpec::text("client_name").required().length(1, 255).searchable().sortable())
        .field(FieldSpec::text("client_email").max_len(255).searchable())
        .field(FieldSpec::uuid("service_id").filterable())
        .field(FieldSpec::timestamp("start_time").required().sortable())
        .field(FieldSpec::timestamp("end_time").required())
        .field(
            FieldSpec::enumeration("status", &["pending", "confirmed", "cancelled", "completed", "no_show"])
                .default_value(json!("pending"))
                .not_null()
                .filterable(),
        )
        .field(FieldSpec::number("price").at_least(0.0))
        .field(FieldSpec::text("notes").max_len(5000))
        .status_field("status")
        .default_sort("start_time", SortOrder::Asc)
}
