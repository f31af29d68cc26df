// Template context structures for Askama templates, organized by page.

use actix_session::Session;

use crate::errors::AppError;
use crate::session::csrf;
use crate::session::flash::take_flash;

pub mod crf;
pub mod study;
pub mod subject;
pub mod visit_entry;

pub use crf::*;
pub use study::*;
pub use subject::*;
pub use visit_entry::*;

pub const APP_NAME: &str = "TrialDesk";

/// Common context shared by all pages.
/// Templates access these as `ctx.flash`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub app_name: String,
    pub flash: Option<String>,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Result<Self, AppError> {
        let flash = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session)?;
        Ok(Self { app_name: APP_NAME.to_string(), flash, csrf_token })
    }
}
