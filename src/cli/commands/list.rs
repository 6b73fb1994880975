//! List shows command handler

use crate::cli::ShowFilters;
use crate::config::Config;
use crate::db::Store;
use crate::services::{CatalogService, SeaOrmCatalogService};

pub async fn cmd_list_shows(config: &Config, filters: &ShowFilters) -> anyhow::Result<()> {
    let store = Store::with_pool_options(&config.general.database_path, &config.general).await?;
    let catalog = SeaOrmCatalogService::new(store, config.catalog.default_page_size);

    let page = catalog.list_shows(&filters.to_params()).await?;

    if page.results.is_empty() {
        println!("No shows found.");
        return Ok(());
    }

    println!(
        "Shows (page {}/{}, {} total)",
        page.current_page, page.total_pages, page.total_records
    );
    println!("{:-<70}", "");

    for show in &page.results {
        let rating = show
            .tmdb_rating
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
        let aired = show.first_air_date.as_deref().unwrap_or("?");

        println!("{} [{}] ★ {}", show.name, aired, rating);
        println!(
            "  ID: {} | Genres: {} | Networks: {}",
            show.id,
            show.genres.as_deref().unwrap_or("-"),
            show.networks.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
