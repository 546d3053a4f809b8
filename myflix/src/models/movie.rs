//! Movie catalog models. Read-only from the client's side.

use serde::{Deserialize, Serialize};

/// Genre details embedded in a movie and served by `/movies/genre/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

/// Director details embedded in a movie and served by `/movies/director/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Birth year. The API is loose about whether this is a number or a string.
    #[serde(rename = "Birth", default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<serde_json::Value>,
    #[serde(rename = "Bio", default)]
    pub bio: String,
}

impl Director {
    /// Birth year rendered for display, empty when unknown.
    pub fn birth_display(&self) -> String {
        match &self.birth {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// A movie in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Genre", default)]
    pub genre: Genre,
    #[serde(rename = "Director", default)]
    pub director: Director,
    #[serde(rename = "ImagePath", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(rename = "Featured", default)]
    pub featured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movie() {
        let json = r#"{
            "_id": "m1",
            "Title": "Inception",
            "Description": "Dreams within dreams.",
            "Genre": {"Name": "Science Fiction", "Description": "Speculative."},
            "Director": {"Name": "Christopher Nolan", "Birth": 1970, "Bio": "British-American."},
            "ImagePath": "inception.png",
            "Featured": true
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, "m1");
        assert_eq!(movie.genre.name, "Science Fiction");
        assert_eq!(movie.director.birth_display(), "1970");
        assert!(movie.featured);
    }

    #[test]
    fn test_director_birth_as_string() {
        let director: Director =
            serde_json::from_str(r#"{"Name":"Greta Gerwig","Birth":"1983","Bio":"x"}"#).unwrap();
        assert_eq!(director.birth_display(), "1983");
    }

    #[test]
    fn test_movie_missing_optional_fields() {
        let movie: Movie = serde_json::from_str(r#"{"_id":"m2","Title":"Heat"}"#).unwrap();
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.director.birth_display(), "");
        assert!(!movie.featured);
    }
}
