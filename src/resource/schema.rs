use serde::Serialize;
use serde_json::{json, Value};

/// System columns present on every resource table
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Boolean,
    Uuid,
    Timestamp,
    Enum { values: &'static [&'static str] },
    Tags,
    Json,
}

/// Column description used for validation, filtering and sorting
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Length bounds for text, item length bound for tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    /// Value bounds for integers and numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub searchable: bool,
    pub filterable: bool,
    pub sortable: bool,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: true,
            default: None,
            min_len: None,
            max_len: None,
            min: None,
            max: None,
            searchable: false,
            filterable: false,
            sortable: false,
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn uuid(name: &'static str) -> Self {
        Self::new(name, FieldKind::Uuid)
    }

    pub fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub fn enumeration(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Enum { values })
    }

    pub fn tags(name: &'static str) -> Self {
        Self::new(name, FieldKind::Tags).default_value(json!([])).not_null()
    }

    pub fn json(name: &'static str) -> Self {
        Self::new(name, FieldKind::Json).default_value(json!({})).not_null()
    }

    /// Must be supplied on create and replace; implies not null
    pub fn required(mut self) -> Self {
        self.required = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_len = Some(min);
        self.max_len = Some(max);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// A business table exposed through the generic CRUD handlers
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub table: &'static str,
    pub owner_column: &'static str,
    pub fields: Vec<FieldSpec>,
    pub default_sort: (&'static str, SortOrder),
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_field: Option<&'static str>,
}

impl ResourceSchema {
    pub fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            owner_column: "user_id",
            fields: Vec::new(),
            default_sort: (CREATED_AT_FIELD, SortOrder::Desc),
            status_field: None,
        }
    }

    pub fn owner_column(mut self, column: &'static str) -> Self {
        self.owner_column = column;
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn default_sort(mut self, column: &'static str, order: SortOrder) -> Self {
        self.default_sort = (column, order);
        self
    }

    /// Column whose values group the stats endpoint; must be a declared field
    pub fn status_field(mut self, column: &'static str) -> Self {
        self.status_field = Some(column);
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_system_field(&self, name: &str) -> bool {
        matches!(name, ID_FIELD | CREATED_AT_FIELD | UPDATED_AT_FIELD) || name == self.owner_column
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        matches!(name, CREATED_AT_FIELD | UPDATED_AT_FIELD)
            || self.field_spec(name).is_some_and(|f| f.sortable)
    }

    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.searchable)
    }

    /// Every column name in table order: system columns first
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec![ID_FIELD, self.owner_column];
        columns.extend(self.fields.iter().map(|f| f.name));
        columns.push(CREATED_AT_FIELD);
        columns.push(UPDATED_AT_FIELD);
        columns
    }

    /// Client-facing description, owner column omitted
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "fields": self.fields,
            "default_sort": {
                "column": self.default_sort.0,
                "order": self.default_sort.1,
            },
            "status_field": self.status_field,
        })
    }
}
