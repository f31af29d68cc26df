use serde::Serialize;

/// A stored entry joined with its field, for the "saved values" table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EntryDisplay {
    pub field_id: i64,
    pub code: String,
    pub label: String,
    pub sort_order: i32,
    pub value_text: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl EntryDisplay {
    pub fn value_or_dash(&self) -> &str {
        self.value_text.as_deref().unwrap_or("—")
    }
}
