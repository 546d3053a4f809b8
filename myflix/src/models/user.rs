//! User model and the request bodies that create or modify one.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A user record as returned by the movie API.
///
/// Field names follow the wire format. Fields the client does not model are
/// kept in `extra` so a cached snapshot round-trips what the server sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Server-side identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login name, also used in every `/users/{username}` route.
    #[serde(rename = "Username", default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Birth date, either `YYYY-MM-DD` or a full ISO timestamp.
    #[serde(rename = "Birth_date", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Ordered favorite movie ids.
    #[serde(rename = "FavMovies", default, deserialize_with = "null_as_default")]
    pub favorite_movies: Vec<String>,
    /// Password hash or placeholder. Never kept in the local cache.
    #[serde(rename = "Password", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Normalize a freshly fetched record before it is cached.
    ///
    /// Drops the password, trims the birth date to its date part and keeps
    /// favorites as-is (missing favorites already deserialize as empty).
    #[must_use]
    pub fn scrubbed(mut self) -> Self {
        self.password = None;
        self.birth_date = self
            .birth_date
            .map(|date| date.split('T').next().unwrap_or_default().to_string())
            .filter(|date| !date.is_empty());
        self
    }

    /// Whether `movie_id` is in the favorites list.
    pub fn is_favorite(&self, movie_id: &str) -> bool {
        self.favorite_movies.iter().any(|id| id == movie_id)
    }
}

/// Read an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Login form payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

/// Registration form payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationDetails {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Birthday", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

/// Profile edit payload.
///
/// The API replaces the whole record, so the caller fills unchanged fields
/// from the cached user.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "Birth_date", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

impl ProfileUpdate {
    /// Start an update from the currently cached user.
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            password: None,
            email: user.email.clone(),
            birth_date: user.birth_date.clone(),
        }
    }
}

/// Successful `/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}
