use askama::Template;

use super::PageContext;
use crate::forms::FieldType;
use crate::models::crf::CrfWithFields;
use crate::models::study::Study;

#[derive(Template)]
#[template(path = "crf_builder.html")]
pub struct CrfBuilderTemplate {
    pub ctx: PageContext,
    pub study: Study,
    pub crfs: Vec<CrfWithFields>,
    pub errors: Vec<String>,
    pub field_types: [FieldType; 5],
}
