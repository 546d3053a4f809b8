//! Data models for the movie API.

mod movie;
mod user;

pub use movie::{Director, Genre, Movie};
pub use user::{Credentials, LoginResponse, ProfileUpdate, RegistrationDetails, UserRecord};
