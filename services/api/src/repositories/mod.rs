//! Repositories for database operations

pub mod audio;
pub mod social;
pub mod user;

pub use audio::AudioRepository;
pub use social::SocialRepository;
pub use user::UserRepository;
