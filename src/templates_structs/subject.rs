use askama::Template;

use super::PageContext;
use crate::models::adverse_event::{AdverseEvent, AdverseEventFormState};
use crate::models::study::Study;
use crate::models::subject::Subject;
use crate::models::visit::Visit;

#[derive(Template)]
#[template(path = "subject_detail.html")]
pub struct SubjectDetailTemplate {
    pub ctx: PageContext,
    pub study: Study,
    pub subject: Subject,
    pub visits: Vec<Visit>,
    pub aevents: Vec<AdverseEvent>,
    pub ae_form: AdverseEventFormState,
    pub visit_errors: Vec<String>,
}

/// `#ae-section` only, returned to htmx requests.
#[derive(Template)]
#[template(path = "partials/ae_section.html")]
pub struct AeSectionTemplate {
    pub ctx: PageContext,
    pub study: Study,
    pub subject: Subject,
    pub aevents: Vec<AdverseEvent>,
    pub ae_form: AdverseEventFormState,
}
