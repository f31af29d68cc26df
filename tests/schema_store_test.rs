//! CRF and field definitions: ordering, choices parsing, uniqueness and
//! the guarantee that a rejected definition persists nothing.

mod common;

use serde_json::{Value, json};
use sqlx::PgPool;

use common::{definition, setup_baseline, setup_study};
use trialdesk::errors::AppError;
use trialdesk::forms::FieldType;
use trialdesk::models::crf;

async fn field_count(pool: &PgPool, crf_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM crf_fields WHERE crf_id = $1")
        .bind(crf_id)
        .fetch_one(pool)
        .await
        .expect("count fields")
}

#[sqlx::test]
async fn test_fields_are_returned_in_sort_order(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    for (code, order) in [("c", 3), ("a", 1), ("d", 4), ("b", 2)] {
        crf::add_field(&pool, fx.crf_id, &definition(code, code, "text", Value::Null, false, order)).await?;
    }

    let fields = crf::find_fields(&pool, fx.crf_id).await?;
    let orders: Vec<i32> = fields.iter().map(|f| f.sort_order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);
    let codes: Vec<&str> = fields.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(codes, vec!["a", "b", "c", "d"]);
    Ok(())
}

#[sqlx::test]
async fn test_equal_order_falls_back_to_creation(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    for code in ["first", "second", "third"] {
        crf::add_field(&pool, fx.crf_id, &definition(code, code, "text", Value::Null, false, 0)).await?;
    }
    let codes: Vec<String> = crf::find_fields(&pool, fx.crf_id).await?.into_iter().map(|f| f.code).collect();
    assert_eq!(codes, vec!["first", "second", "third"]);
    Ok(())
}

#[sqlx::test]
async fn test_serialized_choices_are_stored_as_list(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let field = crf::add_field(&pool, fx.crf_id, &definition("Arm", "arm", "choice", json!("[\"A\",\"B\"]"), false, 0)).await?;
    assert_eq!(field.choices, Some(vec!["A".to_string(), "B".to_string()]));

    let stored = crf::find_field_by_code(&pool, fx.crf_id, "arm").await?.expect("stored field");
    assert_eq!(stored.field_type, FieldType::Choice);
    assert_eq!(stored.choice_list(), ["A".to_string(), "B".to_string()]);
    Ok(())
}

#[sqlx::test]
async fn test_structured_choices_are_stringified(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let field = crf::add_field(&pool, fx.crf_id, &definition("Dose", "dose", "choice", json!([10, 20]), false, 0)).await?;
    assert_eq!(field.choices, Some(vec!["10".to_string(), "20".to_string()]));
    Ok(())
}

#[sqlx::test]
async fn test_bad_choices_persist_nothing(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let result = crf::add_field(&pool, fx.crf_id, &definition("Arm", "arm", "choice", json!("Never"), false, 0)).await;

    match result {
        Err(AppError::Schema(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "choices");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert_eq!(field_count(&pool, fx.crf_id).await, 0);
    Ok(())
}

#[sqlx::test]
async fn test_empty_choices_are_null(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let field = crf::add_field(&pool, fx.crf_id, &definition("Notes", "notes", "text", json!(""), false, 0)).await?;
    assert_eq!(field.choices, None);
    Ok(())
}

#[sqlx::test]
async fn test_duplicate_field_code_is_rejected(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_baseline(&pool).await;
    let result = crf::add_field(&pool, fx.crf_id, &definition("Again", "bp_sys", "text", Value::Null, false, 9)).await;

    match result {
        Err(AppError::Schema(errors)) => assert_eq!(errors[0].field, "code"),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert_eq!(field_count(&pool, fx.crf_id).await, 4);
    Ok(())
}

#[sqlx::test]
async fn test_form_control_key_is_not_a_field_code(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let result = crf::add_field(&pool, fx.crf_id, &definition("Token", "csrf_token", "text", Value::Null, false, 0)).await;

    match result {
        Err(AppError::Schema(errors)) => {
            assert_eq!(errors[0].field, "code");
            assert!(errors[0].message.contains("reserved"));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert_eq!(field_count(&pool, fx.crf_id).await, 0);
    Ok(())
}

#[sqlx::test]
async fn test_same_code_allowed_on_another_crf(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_baseline(&pool).await;
    let other = crf::create(&pool, fx.study_id, "Follow-up CRF", true).await?;
    crf::add_field(&pool, other, &definition("Systolic BP", "bp_sys", "int", Value::Null, true, 1)).await?;
    let field = crf::find_field_by_code(&pool, other, "bp_sys").await?.expect("field");
    assert_eq!(field.field_type, FieldType::Integer);
    Ok(())
}

#[sqlx::test]
async fn test_duplicate_crf_name_is_rejected(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let result = crf::create(&pool, fx.study_id, "Baseline CRF", false).await;
    match result {
        Err(AppError::Schema(errors)) => assert_eq!(errors[0].field, "name"),
        other => panic!("expected schema error, got {other:?}"),
    }
    Ok(())
}

#[sqlx::test]
async fn test_deactivated_crf_is_not_offered(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_study(&pool).await;
    let second = crf::create(&pool, fx.study_id, "Adverse Events CRF", true).await?;

    let active: Vec<i64> = crf::find_active_for_study(&pool, fx.study_id).await?.iter().map(|c| c.id).collect();
    assert_eq!(active, vec![second, fx.crf_id]);

    crf::set_active(&pool, second, false).await?;
    let active: Vec<i64> = crf::find_active_for_study(&pool, fx.study_id).await?.iter().map(|c| c.id).collect();
    assert_eq!(active, vec![fx.crf_id]);

    assert_eq!(crf::find_for_study(&pool, fx.study_id).await?.len(), 2);
    assert!(matches!(crf::set_active(&pool, 999_999, true).await, Err(AppError::NotFound)));
    Ok(())
}

#[sqlx::test]
async fn test_builder_listing_groups_fields_by_crf(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_baseline(&pool).await;
    crf::create(&pool, fx.study_id, "Empty CRF", false).await?;

    let listing = crf::find_with_fields_for_study(&pool, fx.study_id).await?;
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].crf.name, "Baseline CRF");
    assert_eq!(listing[0].fields.len(), 4);
    assert!(listing[1].fields.is_empty());
    Ok(())
}

#[sqlx::test]
async fn test_field_lookup_by_code(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let fx = setup_baseline(&pool).await;

    let by_code = crf::fields_by_code(&pool, fx.crf_id).await?;
    assert_eq!(by_code.len(), 4);
    assert_eq!(by_code["temp_c"].field_type, FieldType::Float);
    assert_eq!(by_code["status"].choices, Some(vec!["Stable".to_string(), "Critical".to_string()]));

    assert!(crf::find_field_by_code(&pool, fx.crf_id, "missing").await?.is_none());
    Ok(())
}
