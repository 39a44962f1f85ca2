//! Chat thread over the analysed documents.

pub mod aggregate;
pub mod service;
