pub mod auth_service;
pub mod data_service;
pub mod film_service;
pub mod list_controller;

pub use auth_service::{AuthService, Session};
pub use data_service::{DataService, DEFAULT_RETENTION_DAYS};
pub use film_service::FilmService;
pub use list_controller::{FilmsListController, ListSnapshot, ITEMS_PER_PAGE};
