//! API models for entities and request/response payloads

pub mod audio;
pub mod user;

pub use audio::{
    AudioDetail, AudioPost, Comment, CommentRequest, FeedItem, FeedQuery, NewAudio,
};
pub use user::{
    AuthResponse, LoginRequest, NewUser, Profile, PublicUser, RegisterRequest, UpdateProfile,
    User, UserResponse,
};
