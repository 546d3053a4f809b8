//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// myflix - Browse the movie catalog and manage your favorites
#[derive(Parser, Debug)]
#[command(name = "myflix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to <config dir>/myflix/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the movie API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file holding the token and cached user
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Refuse authorized calls when no token is stored
    #[arg(long, global = true)]
    pub require_login: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        email: String,

        /// Birthday as YYYY-MM-DD
        #[arg(short, long)]
        birthday: Option<NaiveDate>,
    },

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in username
    Whoami,

    /// List all movies, favorites marked with *
    Movies,

    /// Show a movie's synopsis
    Synopsis {
        /// Movie ID
        id: String,
    },

    /// Show genre details
    Genre {
        /// Genre name
        #[arg(trailing_var_arg = true, required = true)]
        name: Vec<String>,
    },

    /// Show director details
    Director {
        /// Director name
        #[arg(trailing_var_arg = true, required = true)]
        name: Vec<String>,
    },

    /// Add the movie to favorites, or remove it if already there
    Toggle {
        /// Movie ID
        id: String,
    },

    /// Explicitly add or remove a favorite
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    /// List favorite movies
    Favorites,

    /// View or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Delete the account on the server and clear the session
    DeleteAccount {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum FavoriteAction {
    /// Add a movie to favorites
    Add { id: String },
    /// Remove a movie from favorites
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Show the profile
    Show {
        /// Show the last saved state without contacting the server
        #[arg(long)]
        cached: bool,
    },

    /// Update profile fields. Omitted fields keep their cached values.
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_director_with_spaces() {
        let cli = Cli::parse_from(["myflix", "director", "Christopher", "Nolan"]);
        match cli.command {
            Commands::Director { name } => assert_eq!(name.join(" "), "Christopher Nolan"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "myflix",
            "movies",
            "--api-url",
            "http://localhost:8080/",
            "--require-login",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8080/"));
        assert!(cli.require_login);
    }

    #[test]
    fn test_parse_profile_update_date() {
        let cli = Cli::parse_from(["myflix", "profile", "update", "--birth-date", "1990-04-02"]);
        match cli.command {
            Commands::Profile {
                action: ProfileAction::Update { birth_date, .. },
            } => assert_eq!(birth_date, NaiveDate::from_ymd_opt(1990, 4, 2)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_register_rejects_bad_birthday() {
        let result = Cli::try_parse_from([
            "myflix", "register", "-u", "bob", "-p", "pw", "-e", "b@example.com", "-b", "02/04/1990",
        ]);
        assert!(result.is_err());
    }
}
