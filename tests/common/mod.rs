//! Shared fixtures for the database-backed tests.
//!
//! `#[sqlx::test]` hands every test a fresh database with `./migrations`
//! applied; these helpers populate it with a study, one subject, two visits
//! and the Baseline CRF used throughout.

#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::PgPool;

use trialdesk::forms::{FieldDefinition, RawSubmission};
use trialdesk::models::{crf, study, subject, visit};

pub const STUDY_CODE: &str = "TEST-01";

pub struct Fixture {
    pub study_id: i64,
    pub subject_pk: i64,
    pub visit_id: i64,
    pub day7_visit_id: i64,
    pub crf_id: i64,
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn definition(name: &str, code: &str, field_type: &str, choices: Value, required: bool, order: i64) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        code: code.to_string(),
        field_type: field_type.to_string(),
        choices,
        required,
        order: json!(order),
    }
}

pub fn submission(pairs: &[(&str, &str)]) -> RawSubmission {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Study, subject `001`, Baseline and Day 7 visits, and an empty active CRF.
pub async fn setup_study(pool: &PgPool) -> Fixture {
    let study_id = study::create(pool, STUDY_CODE, "Test Study").await.expect("create study");
    let subject_pk = subject::create(pool, study_id, "001", date("2025-01-10"))
        .await
        .expect("create subject");
    let visit_id = visit::create(pool, subject_pk, "Baseline", date("2025-01-10"))
        .await
        .expect("create visit");
    let day7_visit_id = visit::create(pool, subject_pk, "Day 7", date("2025-01-17"))
        .await
        .expect("create visit");
    let crf_id = crf::create(pool, study_id, "Baseline CRF", true).await.expect("create crf");
    Fixture { study_id, subject_pk, visit_id, day7_visit_id, crf_id }
}

/// `setup_study` plus the four Baseline CRF fields.
pub async fn setup_baseline(pool: &PgPool) -> Fixture {
    let fx = setup_study(pool).await;
    let defs = [
        definition("Systolic BP", "bp_sys", "integer", Value::Null, true, 1),
        definition("Temperature (°C)", "temp_c", "float", Value::Null, false, 2),
        definition("Clinical Status", "status", "choice", json!("[\"Stable\",\"Critical\"]"), false, 3),
        definition("On Ventilation", "on_vent", "boolean", Value::Null, false, 4),
    ];
    for def in &defs {
        crf::add_field(pool, fx.crf_id, def).await.expect("add field");
    }
    fx
}
