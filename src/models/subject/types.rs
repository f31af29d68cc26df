use serde::{Deserialize, Serialize};

/// A participant enrolled in a study.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subject {
    pub id: i64,
    pub study_id: i64,
    pub study_code: String,
    /// Site/study-specific identifier, unique within the study.
    pub subject_id: String,
    pub enrolled_at: String,
}

impl Subject {
    pub fn display(&self) -> String {
        format!("{}:{}", self.study_code, self.subject_id)
    }
}

/// Form input for enrolling a subject.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectForm {
    pub subject_id: String,
    pub enrolled_at: String,
    pub csrf_token: String,
}
