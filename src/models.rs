use serde::{Deserialize, Serialize};

/// One normalized floorplan listing for a single property.
///
/// `beds` uses student-housing conventions: `0` is a studio and a fractional
/// `.5` is a shared bedroom. `price` and `sqft` are optional because the
/// source page frequently omits them; a record without a price is still worth
/// surfacing for manual follow-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApartmentRecord {
    pub name: String,
    pub beds: f64,
    pub baths: f64,
    pub price: Option<u32>,
    pub sqft: Option<u32>,
    pub address: String,
}

impl ApartmentRecord {
    /// Two records with the same name and price are the same listing.
    pub fn dedup_key(&self) -> (String, Option<u32>) {
        (self.name.clone(), self.price)
    }

    pub fn is_studio(&self) -> bool {
        self.beds == 0.0
    }
}

/// A physical property whose listings page we scrape. The address is fixed
/// across every record produced from one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub listings_url: String,
    pub address: String,
    pub website: String,
}

impl Property {
    pub fn university_view() -> Self {
        Self {
            name: "University View".to_string(),
            listings_url: "https://live-theview.com/rates-floorplans/".to_string(),
            address: "8400 Baltimore Ave, College Park, MD 20740".to_string(),
            website: "https://live-theview.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: Option<u32>) -> ApartmentRecord {
        ApartmentRecord {
            name: name.to_string(),
            beds: 2.0,
            baths: 2.0,
            price,
            sqft: None,
            address: "8400 Baltimore Ave, College Park, MD 20740".to_string(),
        }
    }

    #[test]
    fn test_dedup_key_matches_for_same_name_and_price() {
        let a = record("University View - 2 Bedroom 2 Bath", Some(1199));
        let b = record("University View - 2 Bedroom 2 Bath", Some(1199));
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_differs_for_different_price() {
        let a = record("University View - 2 Bedroom 2 Bath", Some(1199));
        let b = record("University View - 2 Bedroom 2 Bath", Some(1299));
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_is_studio() {
        let mut r = record("University View - Studio", Some(1050));
        r.beds = 0.0;
        assert!(r.is_studio());
        r.beds = 0.5;
        assert!(!r.is_studio());
    }

    #[test]
    fn test_university_view_property() {
        let property = Property::university_view();
        assert_eq!(property.name, "University View");
        assert!(property.listings_url.contains("rates-floorplans"));
        assert!(property.address.contains("College Park"));
    }
}
