use crate::models::{ApartmentRecord, Property};
use crate::scrapers::PropertyScraper;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Structural signature of one floorplan card on the rates page. Brittle by
/// nature (it tracks an external site's markup), so it lives in exactly one
/// place.
const CARD_MARKER: &str = "div.floorplan.margin-pad.big-bottom";

pub struct UniversityViewScraper {
    property: Property,
}

impl UniversityViewScraper {
    pub fn new(property: Property) -> Self {
        Self { property }
    }

    /// One element per floorplan card, in page order. Zero matches is not an
    /// error; it means no listings were found.
    fn segment(document: &Html) -> Vec<ElementRef<'_>> {
        match Selector::parse(CARD_MARKER) {
            Ok(selector) => document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Extract the card's heading text. Tries known heading tag/class
    /// combinations in priority order, first match wins, then strips
    /// decorative markers.
    fn extract_title(section: &ElementRef) -> Option<String> {
        let title_selectors = vec![
            "h2",
            "h3",
            ".floorplan-title",
            ".fp-title",
            "h4.card-title",
        ];

        let raw = title_selectors.iter().find_map(|sel_str| {
            Selector::parse(sel_str)
                .ok()
                .and_then(|sel| section.select(&sel).next())
                .map(|el| el.text().collect::<String>())
        })?;

        let title = Self::clean_title(&raw);
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }

    /// Strip trailing asterisks and "Download ... PDF" boilerplate that the
    /// page appends to some headings.
    fn clean_title(raw: &str) -> String {
        let mut title = raw.trim().to_string();

        if let Ok(boilerplate) = Regex::new(r"(?i)download\s+.*?pdf") {
            title = boilerplate.replace_all(&title, "").to_string();
        }

        title.trim().trim_end_matches('*').trim().to_string()
    }

    /// Extract the current effective price in whole dollars.
    ///
    /// Primary strategy reads the dedicated rate node; when that node is
    /// absent, falls back to scanning all text in the card. Either way the
    /// *last* dollar amount wins: the page lists a struck-through original
    /// price ahead of the discounted one.
    fn extract_price(section: &ElementRef) -> Option<u32> {
        let rate_selectors = vec![
            "span.special-rates",
            "span.rate",
            "p.rate",
            ".price",
        ];

        let rate_text = rate_selectors.iter().find_map(|sel_str| {
            Selector::parse(sel_str)
                .ok()
                .and_then(|sel| section.select(&sel).next())
                .map(|el| el.text().collect::<String>())
        });

        if let Some(price) = rate_text.as_deref().and_then(Self::last_dollar_amount) {
            return Some(price);
        }

        let all_text = section.text().collect::<Vec<_>>().join(" ");
        Self::last_dollar_amount(&all_text)
    }

    /// Last dollar amount in the text, with `$` and thousands separators
    /// stripped. `None` when no dollar pattern appears at all.
    fn last_dollar_amount(text: &str) -> Option<u32> {
        let dollar_regex = Regex::new(r"\$\s*([0-9][0-9,]*)").ok()?;
        dollar_regex
            .captures_iter(text)
            .last()
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok())
    }

    /// Infer (beds, baths) from the heading text.
    ///
    /// "Studio" (any case) is unconditionally a 0-bed, 1-bath unit. Otherwise
    /// the bed and bath counts are matched independently; each missing count
    /// defaults to 1 rather than failing, so an unmatched bedroom count never
    /// discards a valid bathroom count. A heading matching neither form is
    /// unparseable and the whole card is abandoned by the caller.
    fn parse_bed_bath(title: &str) -> Option<(f64, f64)> {
        if title.to_lowercase().contains("studio") {
            return Some((0.0, 1.0));
        }

        let beds = Regex::new(r"(?i)(\d+(?:\.5)?)\s*bed")
            .ok()
            .and_then(|re| re.captures(title))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());

        let baths = Regex::new(r"(?i)(\d+(?:\.5)?)\s*bath")
            .ok()
            .and_then(|re| re.captures(title))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());

        match (beds, baths) {
            (None, None) => None,
            (beds, baths) => Some((beds.unwrap_or(1.0), baths.unwrap_or(1.0))),
        }
    }

    /// Square footage is only present on some page revisions; scan the card
    /// text for an area pattern.
    fn extract_sqft(section: &ElementRef) -> Option<u32> {
        let text = section.text().collect::<Vec<_>>().join(" ");
        let sqft_regex = Regex::new(r"(?i)([0-9][0-9,]*)\s*(?:sq\.?\s*ft|sqft|square\s+feet)").ok()?;
        sqft_regex
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok())
    }
}

impl PropertyScraper for UniversityViewScraper {
    fn name(&self) -> &str {
        "University View"
    }

    fn property(&self) -> &Property {
        &self.property
    }

    fn parse_document(&self, html: &str) -> Vec<ApartmentRecord> {
        let document = Html::parse_document(html);
        let sections = Self::segment(&document);
        tracing::debug!("Found {} floorplan sections", sections.len());

        let mut records = Vec::new();

        for (index, section) in sections.iter().enumerate() {
            // Field extractors run independently; none of them can fail the
            // others' attempts.
            let title = Self::extract_title(section);
            let price = Self::extract_price(section);
            let sqft = Self::extract_sqft(section);

            let title = match title {
                Some(title) => title,
                None => {
                    tracing::warn!("Section #{} has no recognizable heading, skipping", index + 1);
                    continue;
                }
            };

            let (beds, baths) = match Self::parse_bed_bath(&title) {
                Some(counts) => counts,
                None => {
                    tracing::warn!(
                        "Section #{} has an unparseable unit type '{}', skipping",
                        index + 1,
                        title
                    );
                    continue;
                }
            };

            if price.is_none() {
                tracing::debug!("Section #{} ('{}') has no price, keeping without one", index + 1, title);
            }

            records.push(ApartmentRecord {
                name: format!("{} - {}", self.property.name, title),
                beds,
                baths,
                price,
                sqft,
                address: self.property.address.clone(),
            });
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> UniversityViewScraper {
        UniversityViewScraper::new(Property::university_view())
    }

    fn card(inner: &str) -> String {
        format!(
            r#"<html><body><div class="floorplan margin-pad big-bottom">{}</div></body></html>"#,
            inner
        )
    }

    fn first_section(document: &Html) -> ElementRef<'_> {
        UniversityViewScraper::segment(document)
            .into_iter()
            .next()
            .expect("document should contain one card")
    }

    #[test]
    fn test_segment_counts_cards() {
        let html = r#"
            <html><body>
                <div class="floorplan margin-pad big-bottom"><h2>Studio</h2></div>
                <div class="floorplan margin-pad big-bottom"><h2>2 Bedroom 2 Bath</h2></div>
                <div class="floorplan"><h2>not a full card</h2></div>
            </body></html>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(UniversityViewScraper::segment(&document).len(), 2);
    }

    #[test]
    fn test_segment_empty_document_yields_no_sections() {
        let document = Html::parse_document("<html><body><p>No listings</p></body></html>");
        assert!(UniversityViewScraper::segment(&document).is_empty());
    }

    #[test]
    fn test_extract_title_from_h2() {
        let html = card("<h2>2 Bedroom 2 Bath</h2>");
        let document = Html::parse_document(&html);
        let title = UniversityViewScraper::extract_title(&first_section(&document));
        assert_eq!(title, Some("2 Bedroom 2 Bath".to_string()));
    }

    #[test]
    fn test_extract_title_falls_back_to_h3() {
        let html = card("<h3>4 Bedroom 2 Bath</h3>");
        let document = Html::parse_document(&html);
        let title = UniversityViewScraper::extract_title(&first_section(&document));
        assert_eq!(title, Some("4 Bedroom 2 Bath".to_string()));
    }

    #[test]
    fn test_extract_title_strips_asterisks_and_boilerplate() {
        let html = card("<h2>Studio ** Download Floorplan PDF</h2>");
        let document = Html::parse_document(&html);
        let title = UniversityViewScraper::extract_title(&first_section(&document));
        assert_eq!(title, Some("Studio".to_string()));
    }

    #[test]
    fn test_extract_title_missing_heading() {
        let html = card("<p>just text, no heading</p>");
        let document = Html::parse_document(&html);
        assert_eq!(UniversityViewScraper::extract_title(&first_section(&document)), None);
    }

    #[test]
    fn test_extract_price_from_rate_node() {
        let html = card("<h2>Studio</h2><span class=\"special-rates\">$1,050</span>");
        let document = Html::parse_document(&html);
        let price = UniversityViewScraper::extract_price(&first_section(&document));
        assert_eq!(price, Some(1050));
    }

    #[test]
    fn test_extract_price_takes_last_amount_on_strikethrough() {
        let html = card("<h2>2 Bedroom 2 Bath</h2><span class=\"special-rates\"><s>$1,269</s> $1,199</span>");
        let document = Html::parse_document(&html);
        let price = UniversityViewScraper::extract_price(&first_section(&document));
        assert_eq!(price, Some(1199));
    }

    #[test]
    fn test_extract_price_falls_back_to_section_scan() {
        let html = card("<h2>4 Bedroom 4 Bath</h2><p>Rates starting at $899 per person</p>");
        let document = Html::parse_document(&html);
        let price = UniversityViewScraper::extract_price(&first_section(&document));
        assert_eq!(price, Some(899));
    }

    #[test]
    fn test_extract_price_none_when_no_dollar_pattern() {
        let html = card("<h2>4 Bedroom 2 Bath</h2><p>Call for rates</p>");
        let document = Html::parse_document(&html);
        assert_eq!(UniversityViewScraper::extract_price(&first_section(&document)), None);
    }

    #[test]
    fn test_last_dollar_amount_multiple_matches() {
        assert_eq!(
            UniversityViewScraper::last_dollar_amount("$1,269 $1,199"),
            Some(1199)
        );
    }

    #[test]
    fn test_parse_bed_bath_studio_any_case() {
        assert_eq!(UniversityViewScraper::parse_bed_bath("Studio"), Some((0.0, 1.0)));
        assert_eq!(UniversityViewScraper::parse_bed_bath("STUDIO Deluxe"), Some((0.0, 1.0)));
        assert_eq!(UniversityViewScraper::parse_bed_bath("studio"), Some((0.0, 1.0)));
    }

    #[test]
    fn test_parse_bed_bath_standard_heading() {
        assert_eq!(
            UniversityViewScraper::parse_bed_bath("2 Bedroom 1 Bath"),
            Some((2.0, 1.0))
        );
        assert_eq!(
            UniversityViewScraper::parse_bed_bath("4 Bedroom 4 Bath"),
            Some((4.0, 4.0))
        );
    }

    #[test]
    fn test_parse_bed_bath_without_inner_whitespace() {
        assert_eq!(
            UniversityViewScraper::parse_bed_bath("4 Bedroom2Bath"),
            Some((4.0, 2.0))
        );
    }

    #[test]
    fn test_parse_bed_bath_shared_bedroom_fraction() {
        assert_eq!(
            UniversityViewScraper::parse_bed_bath("4.5 Bedroom 2 Bath Shared"),
            Some((4.5, 2.0))
        );
    }

    #[test]
    fn test_parse_bed_bath_missing_counts_default_independently() {
        // Bath count missing: keep the bed count instead of discarding it
        assert_eq!(
            UniversityViewScraper::parse_bed_bath("3 Bedroom Apartment"),
            Some((3.0, 1.0))
        );
        // Bed count missing: keep the bath count
        assert_eq!(
            UniversityViewScraper::parse_bed_bath("Apartment with 2 Baths"),
            Some((1.0, 2.0))
        );
    }

    #[test]
    fn test_parse_bed_bath_unrecognizable_title() {
        assert_eq!(UniversityViewScraper::parse_bed_bath("Penthouse Suite"), None);
        assert_eq!(UniversityViewScraper::parse_bed_bath(""), None);
    }

    #[test]
    fn test_extract_sqft_variants() {
        let html = card("<h2>2 Bedroom 2 Bath</h2><p>1,150 sq ft</p>");
        let document = Html::parse_document(&html);
        assert_eq!(
            UniversityViewScraper::extract_sqft(&first_section(&document)),
            Some(1150)
        );

        let html = card("<h2>Studio</h2><p>480 sqft of space</p>");
        let document = Html::parse_document(&html);
        assert_eq!(
            UniversityViewScraper::extract_sqft(&first_section(&document)),
            Some(480)
        );
    }

    #[test]
    fn test_extract_sqft_absent() {
        let html = card("<h2>Studio</h2><span class=\"special-rates\">$1,050</span>");
        let document = Html::parse_document(&html);
        assert_eq!(UniversityViewScraper::extract_sqft(&first_section(&document)), None);
    }

    #[test]
    fn test_parse_document_builds_prefixed_records() {
        let html = r#"
            <html><body>
                <div class="floorplan margin-pad big-bottom">
                    <h2>Studio</h2>
                    <span class="special-rates">$1,050</span>
                </div>
            </body></html>
        "#;
        let records = scraper().parse_document(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "University View - Studio");
        assert_eq!(records[0].beds, 0.0);
        assert_eq!(records[0].baths, 1.0);
        assert_eq!(records[0].price, Some(1050));
        assert_eq!(records[0].sqft, None);
        assert_eq!(records[0].address, "8400 Baltimore Ave, College Park, MD 20740");
    }

    #[test]
    fn test_parse_document_keeps_record_without_price() {
        let html = r#"
            <html><body>
                <div class="floorplan margin-pad big-bottom">
                    <h2>4 Bedroom 2 Bath</h2>
                    <p>Call for rates</p>
                </div>
            </body></html>
        "#;
        let records = scraper().parse_document(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, None);
        assert_eq!(records[0].beds, 4.0);
    }

    #[test]
    fn test_parse_document_skips_unparseable_unit_type() {
        let html = r#"
            <html><body>
                <div class="floorplan margin-pad big-bottom">
                    <h2>Clubhouse Amenities</h2>
                    <span class="special-rates">$25</span>
                </div>
                <div class="floorplan margin-pad big-bottom">
                    <h2>2 Bedroom 2 Bath</h2>
                    <span class="special-rates">$1,199</span>
                </div>
            </body></html>
        "#;
        let records = scraper().parse_document(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "University View - 2 Bedroom 2 Bath");
    }

    #[test]
    fn test_parse_document_skips_section_without_heading() {
        let html = r#"
            <html><body>
                <div class="floorplan margin-pad big-bottom">
                    <span class="special-rates">$999</span>
                </div>
            </body></html>
        "#;
        assert!(scraper().parse_document(html).is_empty());
    }

    #[test]
    fn test_parse_document_preserves_page_order() {
        let html = r#"
            <html><body>
                <div class="floorplan margin-pad big-bottom">
                    <h2>4 Bedroom 4 Bath</h2>
                    <span class="special-rates">$899</span>
                </div>
                <div class="floorplan margin-pad big-bottom">
                    <h2>Studio</h2>
                    <span class="special-rates">$1,050</span>
                </div>
            </body></html>
        "#;
        let records = scraper().parse_document(html);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["University View - 4 Bedroom 4 Bath", "University View - Studio"]
        );
    }

    #[test]
    fn test_parse_document_empty_page_is_not_an_error() {
        let records = scraper().parse_document("<html><body><p>Maintenance page</p></body></html>");
        assert!(records.is_empty());
    }
}
