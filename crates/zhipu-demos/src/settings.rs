//! Start-up configuration: `.env`, API key and base URL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use zhipu_ox::{Model, Zhipu, model::categories};

/// Everything the demos need, resolved once before anything runs.
#[derive(Debug)]
pub struct Settings {
    pub client: Zhipu,
    /// The `.env` file that was loaded, if any.
    pub env_file: Option<PathBuf>,
}

impl Settings {
    /// Load `.env` from the working directory (or a parent), then read the
    /// process environment.
    pub fn load() -> Result<Self> {
        let env_file = dotenv::dotenv().ok();
        match &env_file {
            Some(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            None => tracing::debug!("no .env file found, using process environment"),
        }
        Self::from_lookup(|name| std::env::var(name).ok(), env_file)
    }

    pub fn from_lookup<F>(lookup: F, env_file: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client = Zhipu::from_lookup(lookup).context(
            "no API key found; add VITE_ZHIPU_API_KEY=your-api-key to .env or set ZHIPU_API_KEY",
        )?;
        Ok(Self { client, env_file })
    }

    pub fn print_key_status(&self) {
        match &self.env_file {
            Some(path) => println!("✅ Loaded config file: {}", path.display()),
            None => println!("⚠️  No .env file found, using environment variables"),
        }
        println!("✅ API key configured: {}", self.client.masked_api_key());
        println!("🌐 Base URL: {}", self.client.base_url());
    }
}

/// Print the free model catalogue, grouped by category.
pub fn print_model_catalogue() {
    println!("\n{}", "=".repeat(60));
    println!("📋 Zhipu free model catalogue");
    println!("{}", "=".repeat(60));

    for category in categories() {
        println!("\n[{}]", category.to_string().to_uppercase());
        for model in Model::by_category(category) {
            let marker = if model == category.default_model() { " (default)" } else { "" };
            println!("  • {model}{marker}");
            if let Some(description) = model.description() {
                println!("    {description}");
            }
            if let (Some(context), Some(max_output)) = (model.context_window(), model.max_output()) {
                println!(
                    "    context: {}K, max output: {}K",
                    context / 1000,
                    max_output / 1000
                );
            }
        }
    }

    println!("\n{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_reported_before_any_client_exists() {
        let err = Settings::from_lookup(|_| None, None).unwrap_err();
        assert!(err.to_string().contains("VITE_ZHIPU_API_KEY"));
    }

    #[test]
    fn key_and_base_url_come_from_lookup() {
        let settings = Settings::from_lookup(
            |name| match name {
                "VITE_ZHIPU_API_KEY" => Some("abcdefgh-secret-1234".to_string()),
                "VITE_ZHIPU_BASE_URL" => Some("http://127.0.0.1:8080/v4".to_string()),
                _ => None,
            },
            None,
        )
        .unwrap();

        assert_eq!(settings.client.base_url(), "http://127.0.0.1:8080/v4");
        assert_eq!(settings.client.masked_api_key(), "abcdefgh...1234");
    }
}
