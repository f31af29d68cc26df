use chrono::{Duration, Local};
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::errors::AppError;
use crate::forms::FieldDefinition;
use crate::models::{crf, study, subject, visit};

pub const DEMO_STUDY_CODE: &str = "INCEPT-ICU-01";

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Seed a demo study with one subject, two visits and a Baseline CRF.
/// Skipped when the demo study already exists. Written in one transaction,
/// so a failed seed leaves no partial study behind to block the next attempt.
pub async fn seed_demo(pool: &PgPool) -> Result<(), AppError> {
    if study::find_by_code(pool, DEMO_STUDY_CODE).await?.is_some() {
        log::info!("Demo study {DEMO_STUDY_CODE} already present, skipping seed");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let study_id = study::create(&mut *tx, DEMO_STUDY_CODE, "INCEPT ICU Demo Study").await?;
    let today = Local::now().date_naive();
    let subject_pk = subject::create(&mut *tx, study_id, "001", today).await?;
    visit::create(&mut *tx, subject_pk, "Baseline", today).await?;
    visit::create(&mut *tx, subject_pk, "Day 7", today + Duration::days(7)).await?;

    let crf_id = crf::create(&mut *tx, study_id, "Baseline CRF", true).await?;
    for def in demo_fields() {
        crf::add_field(&mut *tx, crf_id, &def).await?;
    }

    tx.commit().await?;
    log::info!("Demo seed complete: study {DEMO_STUDY_CODE}");
    Ok(())
}

fn demo_fields() -> Vec<FieldDefinition> {
    let fields = [
        ("Systolic BP", "bp_sys", "integer", json!(null), true, 1),
        ("Temperature (°C)", "temp_c", "float", json!(null), false, 2),
        ("Clinical Status", "status", "choice", json!(["Stable", "Critical"]), false, 3),
        ("On Ventilation", "on_vent", "boolean", json!(null), false, 4),
    ];
    fields
        .into_iter()
        .map(|(name, code, field_type, choices, required, order)| FieldDefinition {
            name: name.to_string(),
            code: code.to_string(),
            field_type: field_type.to_string(),
            choices,
            required,
            order: json!(order),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validate_field_definition;

    #[test]
    fn demo_fields_are_valid_definitions() {
        let codes: Vec<String> = demo_fields()
            .iter()
            .map(|def| validate_field_definition(def).map(|f| f.code).unwrap())
            .collect();
        assert_eq!(codes, vec!["bp_sys", "temp_c", "status", "on_vent"]);
    }
}
