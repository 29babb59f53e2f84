pub mod attendees;
pub mod csv;
pub mod seminars;
pub mod validation;

pub use attendees::{AttendeeFilter, AttendeeService, BreakfastSummary, ImportOutcome};
pub use seminars::{DeletedSeminar, SeminarService};
pub use validation::{AttendeePayload, RequestValidator, SeminarPayload};
