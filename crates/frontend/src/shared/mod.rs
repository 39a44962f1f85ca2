pub mod api_utils;
pub mod config;
pub mod dialog;
pub mod icons;
pub mod object_storage;
pub mod signal_cell;
