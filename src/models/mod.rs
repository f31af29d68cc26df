pub mod adverse_event;
pub mod crf;
pub mod entry;
pub mod study;
pub mod subject;
pub mod visit;
