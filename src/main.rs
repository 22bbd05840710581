use std::env;

use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use timetable_catalog::{CatalogCache, HttpCatalogSource, config::CatalogConfig};
use timetable_core::{
    geometry::GridGeometry,
    models::ScheduleEntry,
    search::{SearchQuery, SearchSession},
    store::{SEED_TABLE_ID, ScheduleStore},
};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = CatalogConfig::from_env()?;

    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // One cache per session, shared by every consumer
    let source = HttpCatalogSource::new(config.base_url.clone(), config.timeout())?;
    let cache = CatalogCache::new(source);
    let catalog = cache
        .load_all(&config.resources)
        .await
        .wrap_err("Failed to load the course catalog")?;

    let text = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let mut search = SearchSession::new(catalog, config.page_size);
    search.set_query(SearchQuery {
        text,
        ..SearchQuery::default()
    });
    info!("{} lectures match", search.total());
    for lecture in search.visible() {
        info!(
            "{} {} (grade {}, {} credits) {}",
            lecture.id, lecture.title, lecture.grade, lecture.credits, lecture.raw_schedule
        );
    }

    let Some(first) = search.filtered().next() else {
        println!("No lectures match");
        return Ok(());
    };

    let store = ScheduleStore::new();
    store
        .actions()
        .add_entries(SEED_TABLE_ID, ScheduleEntry::from_lecture(first.clone().into()))?;

    let geometry = GridGeometry::default();
    let snapshot = store.reader().snapshot();
    for entry in snapshot.entries(SEED_TABLE_ID).unwrap_or_default() {
        let rect = geometry.to_pixel_rect(entry.day, &entry.range);
        let start = geometry.slot_label(entry.range.first()).unwrap_or_default();
        println!(
            "{} {} {} slots {}-{} ({}) at left={} top={} width={} height={}",
            entry.lecture.title,
            entry.day,
            entry.room,
            entry.range.first(),
            entry.range.last(),
            start,
            rect.left,
            rect.top,
            rect.width,
            rect.height,
        );
    }

    Ok(())
}
