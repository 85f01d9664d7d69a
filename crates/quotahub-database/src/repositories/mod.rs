//! Concrete repository implementations.

pub mod quota;
pub mod server;
pub mod settings;
pub mod user;

pub use quota::QuotaRepository;
pub use server::ServerRepository;
pub use settings::SettingsRepository;
pub use user::UserRepository;
