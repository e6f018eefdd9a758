//! Document model
//!
//! Parsed page snapshots and the target language used to locate elements
//! in them. All HTML parsing stays inside this module; the rest of the
//! harness only sees owned data.

mod document;
mod target;

pub use document::{Document, ElementInfo, FormMethod, FormSubmission, NavPlan};
pub use target::Target;
