pub mod model;
pub mod view;
pub mod view_model;

pub use model::ChatApi;
pub use view::ChatPage;
pub use view_model::ChatThreadVm;
