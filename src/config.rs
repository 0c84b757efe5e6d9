use crate::models::Property;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_property_name")]
    pub property_name: String,
    #[serde(default = "default_listings_url")]
    pub listings_url: String,
    #[serde(default = "default_property_address")]
    pub property_address: String,
    #[serde(default = "default_property_website")]
    pub property_website: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_render_timeout_seconds")]
    pub render_timeout_seconds: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_tab_pause_ms")]
    pub tab_pause_ms: u64,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub google_maps_api_key: Option<String>,
}

fn default_property_name() -> String {
    "University View".to_string()
}

fn default_listings_url() -> String {
    "https://live-theview.com/rates-floorplans/".to_string()
}

fn default_property_address() -> String {
    "8400 Baltimore Ave, College Park, MD 20740".to_string()
}

fn default_property_website() -> String {
    "https://live-theview.com".to_string()
}

fn default_output_path() -> String {
    "data/apartments.csv".to_string()
}

fn default_refresh_interval_seconds() -> u64 {
    3600 // listings move slowly; an hour keeps us polite to the site
}

fn default_render_timeout_seconds() -> u64 {
    90
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_tab_pause_ms() -> u64 {
    750
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            property_name: default_property_name(),
            listings_url: default_listings_url(),
            property_address: default_property_address(),
            property_website: default_property_website(),
            output_path: default_output_path(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
            render_timeout_seconds: default_render_timeout_seconds(),
            settle_delay_ms: default_settle_delay_ms(),
            tab_pause_ms: default_tab_pause_ms(),
            tracing_level: default_tracing_level(),
            user_agent: default_user_agent(),
            google_maps_api_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "data/config.yaml";

        let mut config: Config = if let Ok(config_str) = fs::read_to_string(config_path) {
            serde_yaml::from_str(&config_str)
                .with_context(|| format!("Failed to parse {}", config_path))?
        } else {
            Config::default()
        };

        // Override with environment variables if present
        if let Ok(url) = env::var("LISTINGS_URL") {
            config.listings_url = url;
        }

        if let Ok(name) = env::var("PROPERTY_NAME") {
            config.property_name = name;
        }

        if let Ok(address) = env::var("PROPERTY_ADDRESS") {
            config.property_address = address;
        }

        if let Ok(path) = env::var("OUTPUT_PATH") {
            config.output_path = path;
        }

        if let Ok(interval) = env::var("REFRESH_INTERVAL_SECONDS") {
            config.refresh_interval_seconds = interval
                .parse()
                .context("Failed to parse REFRESH_INTERVAL_SECONDS environment variable")?;
        }

        if let Ok(timeout) = env::var("RENDER_TIMEOUT_SECONDS") {
            config.render_timeout_seconds = timeout
                .parse()
                .context("Failed to parse RENDER_TIMEOUT_SECONDS environment variable")?;
        }

        if let Ok(tracing_level) = env::var("TRACING_LEVEL") {
            config.tracing_level = tracing_level;
        }

        if let Ok(user_agent) = env::var("USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(key) = env::var("GOOGLE_MAPS_API_KEY") {
            if !key.is_empty() {
                config.google_maps_api_key = Some(key);
            }
        }

        // Validate
        if config.listings_url.is_empty() {
            anyhow::bail!("listings_url is required (set via data/config.yaml or LISTINGS_URL env var)");
        }

        if config.refresh_interval_seconds == 0 {
            anyhow::bail!("refresh_interval_seconds must be greater than zero");
        }

        if config.render_timeout_seconds == 0 {
            anyhow::bail!("render_timeout_seconds must be greater than zero");
        }

        Ok(config)
    }

    /// The property this deployment scrapes, assembled from config fields.
    pub fn property(&self) -> Property {
        Property {
            name: self.property_name.clone(),
            listings_url: self.listings_url.clone(),
            address: self.property_address.clone(),
            website: self.property_website.clone(),
        }
    }

    pub fn create_default() -> Result<()> {
        std::fs::create_dir_all("data")?;

        let config_str = serde_yaml::to_string(&Config::default())?;
        fs::write("data/config.yaml", config_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_university_view() {
        let config = Config::default();
        assert_eq!(config.property_name, "University View");
        assert!(config.listings_url.contains("rates-floorplans"));
        assert_eq!(config.refresh_interval_seconds, 3600);
        assert!(config.google_maps_api_key.is_none());
    }

    #[test]
    fn test_config_parses_partial_yaml_with_defaults() {
        let yaml = "output_path: /tmp/out.csv\nrefresh_interval_seconds: 600\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.output_path, "/tmp/out.csv");
        assert_eq!(config.refresh_interval_seconds, 600);
        // Untouched fields fall back to defaults
        assert_eq!(config.property_name, "University View");
        assert_eq!(config.render_timeout_seconds, 90);
    }

    #[test]
    fn test_config_property_assembly() {
        let config = Config::default();
        let property = config.property();
        assert_eq!(property.name, config.property_name);
        assert_eq!(property.listings_url, config.listings_url);
        assert_eq!(property.address, config.property_address);
    }
}
