use askama::Template;

use super::PageContext;
use crate::forms::EntryForm;
use crate::models::crf::Crf;
use crate::models::entry::EntryDisplay;
use crate::models::study::Study;
use crate::models::subject::Subject;
use crate::models::visit::Visit;

#[derive(Template)]
#[template(path = "visit_entry.html")]
pub struct VisitEntryTemplate {
    pub ctx: PageContext,
    pub study: Study,
    pub subject: Subject,
    pub visit: Visit,
    pub crfs: Vec<Crf>,
    pub selected_crf: Option<Crf>,
    pub form: Option<EntryForm>,
    pub entries: Vec<EntryDisplay>,
}

/// `#visit-entry-section` only, returned to htmx requests.
#[derive(Template)]
#[template(path = "partials/visit_entry_section.html")]
pub struct VisitEntrySectionTemplate {
    pub ctx: PageContext,
    pub study: Study,
    pub subject: Subject,
    pub visit: Visit,
    pub selected_crf: Option<Crf>,
    pub form: Option<EntryForm>,
    pub entries: Vec<EntryDisplay>,
}
