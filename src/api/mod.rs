//! API Module
//!
//! Structure:
//! - form.rs: applicant form, options and validation
//! - commands.rs: dashboard session and its commands

pub mod commands;
pub mod form;

#[cfg(test)]
mod tests;

pub use commands::*;
pub use form::{ApplicantForm, Education, FamilyStatus, HousingType, IncomeType};
