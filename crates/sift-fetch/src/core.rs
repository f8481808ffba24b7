//! Pure helpers shared by the fetcher and its callers.

mod name;
mod retry;

pub use name::file_name_from_url;
pub use retry::retry_delay;
