//! Show details command handler

use crate::config::Config;
use crate::db::Store;
use crate::domain::{CatalogError, ShowId};
use crate::services::{CatalogService, SeaOrmCatalogService};

pub async fn cmd_show_info(config: &Config, id_str: &str) -> anyhow::Result<()> {
    let id = match id_str.parse::<i32>() {
        Ok(id) if id > 0 => ShowId::new(id),
        _ => {
            println!("Invalid show ID: {id_str}");
            return Ok(());
        }
    };

    let store = Store::with_pool_options(&config.general.database_path, &config.general).await?;
    let catalog = SeaOrmCatalogService::new(store, config.catalog.default_page_size);

    let show = match catalog.get_show(id).await {
        Ok(show) => show,
        Err(CatalogError::NotFound { .. }) => {
            println!("Show with ID {id} not found.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Show Info");
    println!("{:-<60}", "");
    println!("Name:     {}", show.name);
    if let Some(original) = &show.original_name {
        println!("Original: {original}");
    }
    println!("ID:       {}", show.id);
    println!(
        "Aired:    {} - {}",
        show.first_air_date.as_deref().unwrap_or("?"),
        show.last_air_date.as_deref().unwrap_or("")
    );
    if let Some(status) = &show.status {
        println!("Status:   {status}");
    }
    if let Some(rating) = show.tmdb_rating {
        println!(
            "Rating:   {rating:.1} ({} votes)",
            show.vote_count.unwrap_or(0)
        );
    }

    for (kind, links) in show.relations.iter().flatten() {
        if links.is_empty() {
            continue;
        }
        println!();
        println!("{kind}:");
        for link in links {
            match &link.character_name {
                Some(character) => println!("  - {} as {character}", link.name),
                None => println!("  - {}", link.name),
            }
        }
    }

    if !show.overview.is_empty() {
        println!();
        println!("{}", show.overview);
    }

    println!();
    Ok(())
}
