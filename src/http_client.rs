use anyhow::Result;
use reqwest::{header, Client};

/// Creates the HTTP client used for plain API calls (the walking-time
/// lookup). Page fetching goes through the headless renderer instead; this
/// client never touches the listings page.
pub fn create_http_client(user_agent: &str) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.9"),
    );

    let client = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    Ok(client)
}
