pub mod catalog;
pub mod connectivity;
pub mod error;

pub use catalog::{CatalogApi, CatalogQuery, HttpCatalogClient, DEFAULT_BASE_URL};
pub use connectivity::{ConnectivityHandle, ConnectivityMonitor, NetworkStatus};
pub use error::CatalogError;
