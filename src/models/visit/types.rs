use serde::{Deserialize, Serialize};

/// A scheduled or unscheduled visit for a subject.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Visit {
    pub id: i64,
    /// Row id of the owning subject (not the study-scoped subject identifier).
    pub subject_id: i64,
    pub name: String,
    pub visit_date: String,
}

/// Form input for scheduling a visit.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitForm {
    pub name: String,
    pub visit_date: String,
    pub csrf_token: String,
}
