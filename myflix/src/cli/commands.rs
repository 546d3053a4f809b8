//! CLI command execution.
//!
//! Each command plays the part of one screen: it calls the gateway, prints
//! the result, and on failure prints the screen's failure message.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

use myflix::api::{server_error_detail, ApiClient, ApiError, MissingTokenPolicy};
use myflix::config::Config;
use myflix::models::{Credentials, ProfileUpdate, RegistrationDetails};
use myflix::session::{FileStore, KeyValueStore, MemoryStore, SessionStore};
use myflix::views::{self, FavoriteToggle, MessageBox};

use super::args::{Cli, Commands, FavoriteAction, ProfileAction};

/// Resolve configuration: file and environment first, then CLI flags.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = &cli.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(path) = &cli.session_file {
        config.session_file = Some(path.clone());
    }
    if cli.require_login {
        config.missing_token = MissingTokenPolicy::Reject;
    }

    Ok(config)
}

fn open_client(config: &Config) -> Result<ApiClient> {
    let store: Arc<dyn KeyValueStore> = match config.session_path() {
        Some(path) => {
            debug!(path = %path.display(), "Using session file");
            Arc::new(FileStore::new(path))
        }
        None => {
            eprintln!("Warning: no data directory found, session will not be saved.");
            Arc::new(MemoryStore::new())
        }
    };

    ApiClient::new(config, SessionStore::new(store)).context("Failed to create API client")
}

/// Print the generic failure line and turn the error into a command error.
fn report(err: ApiError, context: &'static str) -> anyhow::Error {
    eprintln!("{}", err.user_message());
    if err.is_unauthorized() {
        eprintln!("Hint: run `myflix login` first.");
    }
    anyhow::Error::new(err).context(context)
}

pub async fn execute(cli: Cli, config: Config) -> Result<()> {
    let client = open_client(&config)?;

    match cli.command {
        Commands::Register {
            username,
            password,
            email,
            birthday,
        } => {
            let details = RegistrationDetails {
                username,
                password,
                email,
                birthday,
            };
            register(&client, &details).await
        }
        Commands::Login { username, password } => {
            login(&client, &Credentials { username, password }).await
        }
        Commands::Logout => logout(&client),
        Commands::Whoami => {
            whoami(&client);
            Ok(())
        }
        Commands::Movies => list_movies(&client).await,
        Commands::Synopsis { id } => show_synopsis(&client, &id).await,
        Commands::Genre { name } => show_genre(&client, &name.join(" ")).await,
        Commands::Director { name } => show_director(&client, &name.join(" ")).await,
        Commands::Toggle { id } => toggle_favorite(&client, &id).await,
        Commands::Favorite { action } => match action {
            FavoriteAction::Add { id } => set_favorite(&client, &id, FavoriteToggle::Add).await,
            FavoriteAction::Remove { id } => {
                set_favorite(&client, &id, FavoriteToggle::Remove).await
            }
        },
        Commands::Favorites => list_favorites(&client).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show { cached } => show_profile(&client, cached).await,
            ProfileAction::Update {
                username,
                email,
                password,
                birth_date,
            } => {
                update_profile(
                    &client,
                    username,
                    email,
                    password,
                    birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
                )
                .await
            }
        },
        Commands::DeleteAccount { yes } => delete_account(&client, yes).await,
    }
}

async fn register(client: &ApiClient, details: &RegistrationDetails) -> Result<()> {
    match client.register(details).await {
        Ok(_) => {
            println!("{}", views::REGISTER_SUCCESS);
            Ok(())
        }
        Err(err) => {
            if let Some(detail) = server_error_detail(&err) {
                eprintln!("{detail}");
            }
            Err(report(err, "Registration failed"))
        }
    }
}

async fn login(client: &ApiClient, credentials: &Credentials) -> Result<()> {
    match client.login(credentials).await {
        Ok(response) if response.token.is_some() => {
            println!("{}", views::LOGIN_SUCCESS);
            Ok(())
        }
        Ok(_) => bail!(views::LOGIN_FAILED),
        Err(err) => {
            eprintln!("{}", views::LOGIN_FAILED);
            Err(anyhow::Error::new(err).context("Login failed"))
        }
    }
}

fn logout(client: &ApiClient) -> Result<()> {
    client.logout().context("Failed to clear session")?;
    println!("{}", views::LOGGED_OUT);
    Ok(())
}

fn whoami(client: &ApiClient) {
    let username = client.session().username();
    if username.is_empty() {
        println!("Not logged in.");
    } else {
        println!("{username}");
    }
}

async fn list_movies(client: &ApiClient) -> Result<()> {
    let movies = client
        .get_all_movies()
        .await
        .map_err(|e| report(e, "Failed to load movies"))?;

    if movies.is_empty() {
        println!("No movies found.");
        return Ok(());
    }

    println!("{}", views::movie_table(&movies, &client.favorite_ids()));
    Ok(())
}

async fn show_synopsis(client: &ApiClient, id: &str) -> Result<()> {
    let movie = client
        .get_movie(id)
        .await
        .map_err(|e| report(e, "Failed to load movie"))?;
    println!("{}", MessageBox::synopsis(&movie));
    Ok(())
}

async fn show_genre(client: &ApiClient, name: &str) -> Result<()> {
    let genre = client
        .get_genre(name)
        .await
        .map_err(|e| report(e, "Failed to load genre"))?;
    println!("{}", MessageBox::genre(&genre));
    Ok(())
}

async fn show_director(client: &ApiClient, name: &str) -> Result<()> {
    let director = client
        .get_director(name)
        .await
        .map_err(|e| report(e, "Failed to load director"))?;
    println!("{}", MessageBox::director(&director));
    Ok(())
}

/// Flip a movie's favorite state based on the server's view of the user.
async fn toggle_favorite(client: &ApiClient, id: &str) -> Result<()> {
    let user = client
        .get_current_user()
        .await
        .map_err(|e| report(e, "Failed to load favorites"))?;
    let action = FavoriteToggle::for_movie(&user.favorite_movies, id);
    set_favorite(client, id, action).await
}

async fn set_favorite(client: &ApiClient, id: &str, action: FavoriteToggle) -> Result<()> {
    let result = match action {
        FavoriteToggle::Add => client.add_favorite(id).await,
        FavoriteToggle::Remove => client.remove_favorite(id).await,
    };
    result.map_err(|e| report(e, "Failed to update favorites"))?;

    println!("{}", MessageBox::new("Success", action.message()));
    Ok(())
}

async fn list_favorites(client: &ApiClient) -> Result<()> {
    let user = client
        .refresh_user()
        .await
        .map_err(|e| report(e, "Failed to load profile"))?;
    let movies = client
        .get_all_movies()
        .await
        .map_err(|e| report(e, "Failed to load movies"))?;

    let favorites = views::favorite_movies(&movies, &user.favorite_movies);
    if favorites.is_empty() {
        println!("No favorite movies yet.");
        return Ok(());
    }

    for movie in favorites {
        println!("{:<26} {}", movie.id, movie.title);
    }
    Ok(())
}

async fn show_profile(client: &ApiClient, cached: bool) -> Result<()> {
    let user = if cached {
        let user = client
            .session()
            .user()
            .context("No saved profile. Log in first.")?;
        println!("{}", views::PROFILE_RESET);
        user
    } else {
        client
            .refresh_user()
            .await
            .map_err(|e| report(e, "Failed to load profile"))?
    };

    for line in views::profile_lines(&user) {
        println!("{line}");
    }
    Ok(())
}

async fn update_profile(
    client: &ApiClient,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    birth_date: Option<String>,
) -> Result<()> {
    let cached = client.session().user().unwrap_or_default();
    let mut update = ProfileUpdate::from_user(&cached);
    if let Some(username) = username {
        update.username = username;
    }
    if email.is_some() {
        update.email = email;
    }
    if password.is_some() {
        update.password = password;
    }
    if birth_date.is_some() {
        update.birth_date = birth_date;
    }

    match client.update_profile(&update).await {
        Ok(user) => {
            println!("{}", views::PROFILE_UPDATED);
            for line in views::profile_lines(&user) {
                println!("{line}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", views::PROFILE_UPDATE_FAILED);
            Err(anyhow::Error::new(err).context("Profile update failed"))
        }
    }
}

async fn delete_account(client: &ApiClient, yes: bool) -> Result<()> {
    let username = client.session().username();
    if !yes && !confirm(&format!("Delete account '{username}'? This cannot be undone. [y/N] "))? {
        println!("Aborted.");
        return Ok(());
    }

    client
        .delete_account()
        .await
        .map_err(|e| report(e, "Failed to delete account"))?;
    client.logout().context("Failed to clear session")?;

    println!("{}", views::ACCOUNT_DELETED);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[test]
    fn test_cli_flags_override_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "api_url = \"http://from-file/\"\n").unwrap();
        let session_path = dir.path().join("session.json");

        let args: Vec<OsString> = vec![
            "myflix".into(),
            "--config".into(),
            config_path.into_os_string(),
            "--api-url".into(),
            "http://from-flag/".into(),
            "--session-file".into(),
            session_path.clone().into_os_string(),
            "--require-login".into(),
            "whoami".into(),
        ];
        let cli = Cli::parse_from(args);
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.api_url, "http://from-flag/");
        assert_eq!(config.session_path(), Some(session_path));
        assert_eq!(config.missing_token, MissingTokenPolicy::Reject);
    }

    #[test]
    fn test_open_client_uses_session_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let config = Config {
            session_file: Some(path.clone()),
            ..Config::default()
        };

        let client = open_client(&config).unwrap();
        client.session().set_token("t1").unwrap();

        let reopened = open_client(&config).unwrap();
        assert_eq!(reopened.session().token().as_deref(), Some("t1"));
        assert!(path.exists());
    }
}
