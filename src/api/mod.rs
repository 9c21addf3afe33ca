pub mod auth;
pub mod error;
pub mod films;
pub mod health;
pub mod response;

use std::sync::Arc;

use crate::database::Database;
use crate::services::{AuthService, FilmService};

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub films: Arc<FilmService>,
    pub auth: Arc<AuthService>,
}
