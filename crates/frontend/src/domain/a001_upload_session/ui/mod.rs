//! Upload Session UI Module (MVVM Standard)
//!
//! Structure:
//! - model.rs: analysis service client
//! - view_model.rs: UploadSessionVm with RwSignals and actions
//! - view.rs: Main component UploadPage

mod model;
mod view;
mod view_model;

pub use model::AnalysisApi;
pub use view::UploadPage;
pub use view_model::UploadSessionVm;
