pub mod university_view;

pub use university_view::UniversityViewScraper;

use crate::models::{ApartmentRecord, Property};

/// Trait that all property scrapers must implement. A scraper owns the
/// markup knowledge for one listings page: how to segment it into cards and
/// how to pull fields out of each card. It never fetches; it is handed the
/// already-rendered document.
pub trait PropertyScraper: Send + Sync {
    /// Returns the name of the scraper/property.
    fn name(&self) -> &str;

    /// The property this scraper covers.
    fn property(&self) -> &Property;

    /// Reduces one rendered document to listing records, page order
    /// preserved. Unparseable cards are skipped and logged, never raised.
    fn parse_document(&self, html: &str) -> Vec<ApartmentRecord>;
}
