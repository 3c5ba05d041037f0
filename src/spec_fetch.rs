//! ORD specification download and section extraction.
//!
//! The specification is a single markdown document. [`SpecFetcher`] fetches
//! it once per process with the configured timeout and keeps the body;
//! there are no retries, so a failed fetch is reported and tried again on
//! the next call.

use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::SpecConfig;
use crate::error::{FetchError, ToolError};

pub struct SpecFetcher {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
    cache: OnceCell<String>,
}

impl SpecFetcher {
    pub fn new(config: &SpecConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ord-assist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url: config.url.clone(),
            timeout_secs: config.timeout_secs,
            client,
            cache: OnceCell::new(),
        })
    }

    /// Build a fetcher whose cache already holds `text`.
    pub fn with_text(config: &SpecConfig, text: impl Into<String>) -> anyhow::Result<Self> {
        let fetcher = Self::new(config)?;
        fetcher
            .cache
            .set(text.into())
            .map_err(|_| anyhow::anyhow!("specification cache already initialized"))?;
        Ok(fetcher)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The full specification text, downloading it on first use.
    pub async fn text(&self) -> Result<&str, FetchError> {
        let text = self
            .cache
            .get_or_try_init(|| self.download())
            .await?;
        Ok(text.as_str())
    }

    async fn download(&self) -> Result<String, FetchError> {
        tracing::info!(url = %self.url, "fetching ORD specification");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: self.url.clone(),
                    secs: self.timeout_secs,
                }
            } else {
                FetchError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: self.url.clone(),
                    secs: self.timeout_secs,
                }
            } else {
                FetchError::Transport(e)
            }
        })?;

        tracing::info!(bytes = body.len(), "specification cached");
        Ok(body)
    }
}

/// A markdown heading: level and text.
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_end();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

/// Level-2 headings of `text`, in order. Fenced code blocks are skipped.
pub fn list_sections(text: &str) -> Vec<String> {
    let mut in_fence = false;
    let mut sections = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((2, title)) = heading(line) {
            sections.push(title.to_string());
        }
    }
    sections
}

/// Extract the first section whose heading contains `query`
/// (case-insensitive), up to the next heading of the same or higher level.
pub fn extract_section(text: &str, query: &str) -> Result<String, ToolError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(ToolError::invalid("section must not be empty"));
    }

    let mut in_fence = false;
    let mut start: Option<usize> = None;
    let mut collected: Vec<&str> = Vec::new();

    for line in text.lines() {
        let is_fence = line.trim_start().starts_with("```");
        if !in_fence && !is_fence {
            if let Some((level, title)) = heading(line) {
                match start {
                    Some(start_level) if level <= start_level => break,
                    None if title.to_lowercase().contains(&needle) => start = Some(level),
                    _ => {}
                }
            }
        }
        if is_fence {
            in_fence = !in_fence;
        }
        if start.is_some() {
            collected.push(line);
        }
    }

    if start.is_none() {
        return Err(ToolError::NotFound(format!(
            "section '{}' not found; available sections: {}",
            query.trim(),
            list_sections(text).join(", ")
        )));
    }

    Ok(collected.join("\n").trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = "# ORD Specification\n\nIntro.\n\n## Introduction\n\nWhat ORD is.\n\n### Goals\n\nGoal text.\n\n## Consumption Bundle\n\nBundles group APIs.\n\n```md\n## Not a heading\n```\n\nMore bundle text.\n\n## Tombstone\n\nRemoved things.\n";

    #[test]
    fn test_list_sections_skips_fences() {
        assert_eq!(
            list_sections(SPEC),
            vec!["Introduction", "Consumption Bundle", "Tombstone"]
        );
    }

    #[test]
    fn test_extract_includes_subsections() {
        let section = extract_section(SPEC, "introduction").unwrap();
        assert!(section.starts_with("## Introduction"));
        assert!(section.contains("### Goals"));
        assert!(!section.contains("Consumption Bundle"));
    }

    #[test]
    fn test_extract_ignores_headings_in_fences() {
        let section = extract_section(SPEC, "bundle").unwrap();
        assert!(section.contains("## Not a heading"));
        assert!(section.contains("More bundle text."));
        assert!(!section.contains("Tombstone"));
    }

    #[test]
    fn test_missing_section_lists_available() {
        let err = extract_section(SPEC, "Packages").unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(err.to_string().contains("Consumption Bundle"));
    }

    #[tokio::test]
    async fn test_preloaded_cache_skips_network() {
        let config = SpecConfig {
            url: "http://127.0.0.1:9/unreachable.md".to_string(),
            timeout_secs: 1,
        };
        let fetcher = SpecFetcher::with_text(&config, SPEC).unwrap();
        assert_eq!(fetcher.text().await.unwrap(), SPEC);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = SpecConfig {
            url: "http://127.0.0.1:9/unreachable.md".to_string(),
            timeout_secs: 2,
        };
        let fetcher = SpecFetcher::new(&config).unwrap();
        let err = fetcher.text().await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Transport(_) | FetchError::Timeout { .. }
        ));
    }
}
