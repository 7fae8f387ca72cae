pub mod add_session;
pub mod menu;
pub mod workshop_details;
pub mod workshops_list;

pub use add_session::AddSessionPage;
pub use menu::MenuBar;
pub use workshop_details::WorkshopDetailsPage;
pub use workshops_list::WorkshopsListPage;
