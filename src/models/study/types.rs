use serde::{Deserialize, Serialize};

/// A clinical study/trial container.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Study {
    pub id: i64,
    /// Short unique code, e.g. `INCEPT-ICU-01`. Used in URLs.
    pub code: String,
    pub name: String,
    pub created_at: String,
}

impl Study {
    pub fn display(&self) -> String {
        format!("{} — {}", self.code, self.name)
    }
}

/// Form input for creating a study.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyForm {
    pub code: String,
    pub name: String,
    pub csrf_token: String,
}
