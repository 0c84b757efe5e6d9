use crate::error::FetchError;
use crate::models::ApartmentRecord;
use crate::renderer::PageRenderer;
use crate::scrapers::PropertyScraper;
use crate::sink::CsvSink;
use std::collections::HashSet;

/// One extraction run: render the listings page, reduce it to records,
/// deduplicate, persist the snapshot, and hand the records back.
///
/// Only a total fetch failure aborts the run. A malformed section is skipped
/// inside the scraper, a missing optional field rides along as `None`, and a
/// sink write failure is logged without invalidating the in-memory result.
pub struct ExtractionPipeline<R, S> {
    renderer: R,
    scraper: S,
    sink: CsvSink,
}

impl<R: PageRenderer, S: PropertyScraper> ExtractionPipeline<R, S> {
    pub fn new(renderer: R, scraper: S, sink: CsvSink) -> Self {
        Self {
            renderer,
            scraper,
            sink,
        }
    }

    pub async fn run(&self) -> Result<Vec<ApartmentRecord>, FetchError> {
        let url = self.scraper.property().listings_url.clone();
        tracing::info!("Starting extraction run for {} ({})", self.scraper.name(), url);

        let html = self.renderer.render(&url).await?;

        if tracing::enabled!(tracing::Level::TRACE) {
            if let Err(e) = std::fs::write("debug_rendered.html", &html) {
                tracing::warn!("Failed to write debug HTML: {}", e);
            }
        }

        let records = normalize(self.scraper.parse_document(&html));
        tracing::info!(
            "Extracted {} unique floorplans from {}",
            records.len(),
            self.scraper.name()
        );

        if let Err(e) = self.sink.write(&records) {
            tracing::warn!(
                "Failed to persist snapshot to {}: {} (in-memory result still valid)",
                self.sink.path().display(),
                e
            );
        }

        Ok(records)
    }
}

/// Collapse records that normalized to the same `(name, price)` pair; they
/// are the same listing scraped from duplicate cards. Keeps the first
/// occurrence, page order preserved.
pub fn normalize(records: Vec<ApartmentRecord>) -> Vec<ApartmentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key()))
        .collect()
}
