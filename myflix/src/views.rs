//! Screen-level view logic, kept free of I/O so it can be tested directly.

use std::fmt;

use crate::models::{Director, Genre, Movie, UserRecord};

pub const REGISTER_SUCCESS: &str = "User registered successfully!";
pub const LOGIN_SUCCESS: &str = "User login successfully!";
pub const LOGIN_FAILED: &str = "Login failed! Please check your input or register first.";
pub const FAVORITE_ADDED: &str = "Movie added to favorites!";
pub const FAVORITE_REMOVED: &str = "Movie removed from favorites!";
pub const PROFILE_UPDATED: &str = "Profile updated successfully!";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile. Please try again.";
pub const PROFILE_RESET: &str = "Profile reset to the last saved state.";
pub const ACCOUNT_DELETED: &str = "Account deleted.";
pub const LOGGED_OUT: &str = "Logged out.";

/// A titled message, the terminal stand-in for a dialog box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBox {
    pub title: String,
    pub content: String,
}

impl MessageBox {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn genre(genre: &Genre) -> Self {
        Self::new(format!("Genre: {}", genre.name), genre.description.clone())
    }

    pub fn director(director: &Director) -> Self {
        Self::new(
            format!("Director: {}", director.name),
            format!(
                "Birth Year: {}\nBio: {}",
                director.birth_display(),
                director.bio
            ),
        )
    }

    pub fn synopsis(movie: &Movie) -> Self {
        Self::new(movie.title.clone(), movie.description.clone())
    }
}

impl fmt::Display for MessageBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "-".repeat(self.title.chars().count().max(3)))?;
        write!(f, "{}", self.content)
    }
}

/// What a click on the favorite toggle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Add,
    Remove,
}

impl FavoriteToggle {
    pub fn for_movie(favorite_ids: &[String], movie_id: &str) -> Self {
        if favorite_ids.iter().any(|id| id == movie_id) {
            Self::Remove
        } else {
            Self::Add
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::Add => FAVORITE_ADDED,
            Self::Remove => FAVORITE_REMOVED,
        }
    }
}

/// Movies whose id is in `favorite_ids`, in catalog order.
pub fn favorite_movies<'a>(movies: &'a [Movie], favorite_ids: &[String]) -> Vec<&'a Movie> {
    movies
        .iter()
        .filter(|movie| favorite_ids.contains(&movie.id))
        .collect()
}

/// Catalog table, favorites marked with a star.
pub fn movie_table(movies: &[Movie], favorite_ids: &[String]) -> String {
    let mut out = format!(
        "{:<2} {:<26} {:<32} {:<18} {}\n",
        "", "ID", "TITLE", "GENRE", "DIRECTOR"
    );
    out.push_str(&"-".repeat(96));
    for movie in movies {
        let marker = if favorite_ids.contains(&movie.id) {
            "*"
        } else {
            ""
        };
        out.push('\n');
        out.push_str(&format!(
            "{:<2} {:<26} {:<32} {:<18} {}",
            marker,
            movie.id,
            truncate(&movie.title, 30),
            truncate(&movie.genre.name, 16),
            movie.director.name,
        ));
    }
    out
}

/// Profile card lines.
pub fn profile_lines(user: &UserRecord) -> Vec<String> {
    vec![
        format!("Username:   {}", user.username),
        format!("Email:      {}", user.email.as_deref().unwrap_or("-")),
        format!("Birth date: {}", user.birth_date.as_deref().unwrap_or("-")),
        format!("Favorites:  {}", user.favorite_movies.len()),
    ]
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
