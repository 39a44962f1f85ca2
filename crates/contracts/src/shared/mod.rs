pub mod api_error;
pub mod markdown;
pub mod state_cell;
