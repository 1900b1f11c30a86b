mod activities;
mod errors;
mod media;
mod organization;
mod social_graph;
mod user;

pub use activities::register_sample_activities;
pub use errors::DomainError;
pub use media::{Album, Photo};
pub use organization::Organization;
pub use social_graph::{SocialGraph, FOLLOWERS, FRIENDS};
pub use user::User;
