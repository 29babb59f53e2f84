//! HTTP handlers for seminars and attendees.

pub mod attendee;
pub mod seminar;
pub use attendee::*;
pub use seminar::*;
