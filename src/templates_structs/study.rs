use askama::Template;

use super::PageContext;
use crate::models::study::Study;
use crate::models::subject::Subject;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub studies: Vec<Study>,
    pub errors: Vec<String>,
    pub form_code: String,
    pub form_name: String,
}

#[derive(Template)]
#[template(path = "study_detail.html")]
pub struct StudyDetailTemplate {
    pub ctx: PageContext,
    pub study: Study,
    pub subjects: Vec<Subject>,
    pub errors: Vec<String>,
    pub form_subject_id: String,
    pub form_enrolled_at: String,
}
