//! In-memory adapters used when no database or document store is configured.
//!
//! State lives in process memory behind `tokio::sync::RwLock` and is lost on
//! restart. Development servers and HTTP tests run on these.

mod records;
mod refresh_tokens;
mod users;

pub use records::InMemoryRecordRepository;
pub use refresh_tokens::InMemoryRefreshTokenStore;
pub use users::InMemoryUserRepository;
