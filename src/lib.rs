//! Credit Scoring Dashboard - Core Library

pub mod api;
pub mod constants;
pub mod logic;
