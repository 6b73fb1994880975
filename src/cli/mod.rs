//! Command-line interface for tvcatalog.

mod commands;

use clap::{Args, Parser, Subcommand};

use crate::db::ListParams;

/// tvcatalog - TV show catalog service
#[derive(Parser)]
#[command(name = "tvcatalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// List shows with the same filters as `GET /api/v1/shows`
    #[command(alias = "ls", alias = "list")]
    Shows(ShowFilters),

    /// Print one show with its related entities
    #[command(alias = "info")]
    Show {
        /// Show ID
        id: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct ShowFilters {
    /// Substring of the show name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub actor: Option<String>,

    #[arg(long)]
    pub network: Option<String>,

    #[arg(long)]
    pub creator: Option<String>,

    #[arg(long)]
    pub studio: Option<String>,

    /// Year of the first air date
    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub min_rating: Option<String>,

    #[arg(long, default_value = "1")]
    pub page: u64,

    #[arg(long)]
    pub page_size: Option<u64>,

    /// id, name, first_air_date, tmdb_rating, popularity or vote_count
    #[arg(long)]
    pub sort_by: Option<String>,

    /// asc or desc
    #[arg(long)]
    pub order: Option<String>,
}

impl ShowFilters {
    /// Query parameters equivalent to these flags.
    #[must_use]
    pub fn to_params(&self) -> ListParams {
        let optional = [
            ("name", &self.name),
            ("genre", &self.genre),
            ("actor", &self.actor),
            ("network", &self.network),
            ("creator", &self.creator),
            ("studio", &self.studio),
            ("year", &self.year),
            ("minRating", &self.min_rating),
            ("sortBy", &self.sort_by),
            ("order", &self.order),
        ];

        let mut params: ListParams = optional
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
            .collect();

        params = params.with("page", self.page.to_string());
        if let Some(size) = self.page_size {
            params = params.with("pageSize", size.to_string());
        }
        params
    }
}

pub use commands::*;
