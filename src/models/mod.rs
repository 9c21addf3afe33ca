pub mod cached;
pub mod dto;
pub mod film;
pub mod filter;
pub mod sort;
pub mod user;

pub use cached::{CachedBrand, CachedFilm};
pub use dto::FilmsDTO;
pub use film::{Film, FilmColorType};
pub use filter::FilmFilter;
pub use sort::{sort_films, FilmSortField, FilmSortOption, SortDirection};
pub use user::{password_digest, AuthError, User, LOCAL_PASSWORD_DIGESTS, LOCAL_USERS};
