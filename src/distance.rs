use crate::http_client;
use anyhow::Result;

/// Sentinel returned when a walking time cannot be computed for any reason.
/// The lookup never raises to its caller.
pub const UNAVAILABLE: &str = "Unavailable";

const DISTANCE_MATRIX_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Walking-time lookup against the Google Distance Matrix API.
pub struct WalkingTimeClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl WalkingTimeClient {
    pub fn new(api_key: Option<String>, user_agent: &str) -> Self {
        Self {
            client: http_client::create_http_client(user_agent)
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_key,
        }
    }

    /// Human-readable walking duration between two addresses (e.g. "18 mins"),
    /// or [`UNAVAILABLE`] on any failure: missing key, network error, non-2xx
    /// response, or a body without a duration (zero results, bad address).
    pub async fn walking_time(&self, origin: &str, destination: &str) -> String {
        let Some(api_key) = &self.api_key else {
            tracing::debug!("No Google Maps API key configured, walking time unavailable");
            return UNAVAILABLE.to_string();
        };

        match self.request(origin, destination, api_key).await {
            Ok(duration) => duration,
            Err(e) => {
                tracing::warn!("Walking time lookup failed for '{}': {}", destination, e);
                UNAVAILABLE.to_string()
            }
        }
    }

    async fn request(&self, origin: &str, destination: &str, api_key: &str) -> Result<String> {
        let response = self
            .client
            .get(DISTANCE_MATRIX_URL)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("mode", "walking"),
                ("key", api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;

        body["rows"][0]["elements"][0]["duration"]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("response contains no walking duration"))
    }
}

/// Campus destinations students filter by, keyed by school name.
pub fn campus_destinations() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "A. James Clark School of Engineering",
            "8228 Paint Branch Dr, College Park, MD 20742",
        ),
        (
            "Robert H. Smith School of Business",
            "7621 Mowatt Ln, College Park, MD 20742",
        ),
        (
            "Philip Merrill College of Journalism",
            "7765 Alumni Dr, College Park, MD 20742",
        ),
        (
            "College of Computer, Mathematical, and Natural Sciences",
            "8125 Paint Branch Dr, College Park, MD 20742",
        ),
        (
            "School of Public Health",
            "4200 Valley Dr, College Park, MD 20742",
        ),
        (
            "College of Arts and Humanities",
            "Francis Scott Key Hall, College Park, MD 20742",
        ),
    ]
}

/// Google Maps walking-directions link for a listing address.
pub fn directions_link(address: &str) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={}&travelmode=walking",
        urlencoding::encode(address)
    )
}
