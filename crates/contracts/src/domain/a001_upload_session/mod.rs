//! Upload/analysis session: up to three PDFs tracked from selection through
//! upload to a single analyse call.

pub mod aggregate;
pub mod service;
