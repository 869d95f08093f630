//! Domain suggestion stage.
//!
//! Triggered by `bootstrap.json`. Builds candidate keywords from the theme
//! and topics, asks the registrar which `{keyword}.{tld}` domains are free,
//! and writes the cheapest ten to `generated/DomainNames.json`.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use super::{Stage, Trigger};
use crate::clients::DomainRegistrar;
use crate::config::DomainConfig;
use crate::core::{DomainSuggestion, StageOutput};
use crate::errors::{BlogflowError, Result};
use crate::observability::StageLogger;
use crate::pipeline::Sleeper;
use crate::storage::{self, paths, BlobStore};

/// Suggestions written at most.
pub const MAX_SUGGESTIONS: usize = 10;
/// Keywords sent to the registrar.
pub const MAX_KEYWORDS: usize = 20;
/// TLDs tried per keyword.
pub const MAX_TLDS: usize = 5;

const PREFIXES: [&str; 4] = ["the", "my", "best", "top"];
const SUFFIXES: [&str; 6] = ["hub", "spot", "central", "blog", "guru", "pro"];

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct Theme {
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TopicEntry {
    Name(String),
    Record {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        topic: Option<String>,
    },
}

impl TopicEntry {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Name(name) => Some(name),
            Self::Record { title, topic } => title.or(topic),
        }
    }
}

/// Lower-cases `word` and drops everything outside `[a-z0-9]`.
#[must_use]
pub fn normalize(word: &str) -> String {
    NON_ALPHANUMERIC.replace_all(&word.to_lowercase(), "").into_owned()
}

/// Expands base words into domain keywords, deduplicated in first-seen order.
///
/// Each base yields itself, `{prefix}{base}` and `{base}{suffix}`.
#[must_use]
pub fn candidate_keywords<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for base in words.into_iter().map(normalize).filter(|w| !w.is_empty()) {
        let variants = std::iter::once(base.clone())
            .chain(PREFIXES.iter().map(|p| format!("{p}{base}")))
            .chain(SUFFIXES.iter().map(|s| format!("{base}{s}")));
        for keyword in variants {
            if seen.insert(keyword.clone()) {
                keywords.push(keyword);
            }
        }
    }
    keywords
}

/// Suggests registrable domain names for a new blog.
pub struct DomainNameStage {
    store: Arc<dyn BlobStore>,
    registrar: Option<Arc<dyn DomainRegistrar>>,
    sleeper: Arc<dyn Sleeper>,
    config: DomainConfig,
    logger: StageLogger,
}

impl std::fmt::Debug for DomainNameStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainNameStage")
            .field("has_registrar", &self.registrar.is_some())
            .field("tlds", &self.config.tlds)
            .finish_non_exhaustive()
    }
}

impl DomainNameStage {
    /// Stage name.
    pub const NAME: &'static str = "domain_names";

    /// Creates the stage. A `None` registrar means credentials are missing
    /// and every invocation fails as a configuration error.
    #[must_use]
    pub fn new(
        store: Arc<dyn BlobStore>,
        registrar: Option<Arc<dyn DomainRegistrar>>,
        sleeper: Arc<dyn Sleeper>,
        config: DomainConfig,
        logger: StageLogger,
    ) -> Self {
        Self {
            store,
            registrar,
            sleeper,
            config,
            logger,
        }
    }

    async fn load_keywords(&self) -> Result<Vec<String>> {
        let theme: Theme = storage::read_json(self.store.as_ref(), paths::THEME)
            .await?
            .ok_or_else(|| BlogflowError::config(format!("{} not found", paths::THEME)))?;
        let topics: Vec<TopicEntry> = storage::read_json(self.store.as_ref(), paths::TOPICS)
            .await?
            .ok_or_else(|| BlogflowError::config(format!("{} not found", paths::TOPICS)))?;

        let topics: Vec<String> = topics.into_iter().filter_map(TopicEntry::into_text).collect();
        let words = std::iter::once(theme.name.as_str())
            .chain(topics.iter().map(String::as_str))
            .chain(theme.keywords.iter().map(String::as_str));
        Ok(candidate_keywords(words))
    }

    async fn suggest(&self, registrar: &dyn DomainRegistrar, keywords: &[String]) -> Vec<DomainSuggestion> {
        let tlds: Vec<&str> = self.config.tlds.iter().take(MAX_TLDS).map(String::as_str).collect();
        let max_price = self.config.max_price;
        let mut answered = HashSet::new();
        let mut failed = 0usize;
        let mut found = Vec::new();

        let domains: Vec<String> = keywords
            .iter()
            .take(MAX_KEYWORDS)
            .flat_map(|keyword| tlds.iter().map(move |tld| format!("{keyword}.{tld}")))
            .collect();
        for (i, domain) in domains.into_iter().enumerate() {
            if i > 0 {
                self.sleeper.sleep(self.config.query_delay()).await;
            }

            match registrar.check_availability(&domain).await {
                Ok(availability) => {
                    answered.insert(domain.clone());
                    match availability.price {
                        Some(price) if availability.available && price <= max_price => {
                            found.push(DomainSuggestion {
                                domain,
                                available: true,
                                price,
                            });
                        }
                        _ => {}
                    }
                }
                Err(e) => {
                    failed += 1;
                    self.logger.warn(&format!("Availability check for {domain} failed: {e}"));
                }
            }
        }

        if failed > 0 && answered.is_empty() {
            self.logger.warn(&format!(
                "All {failed} availability checks failed, suggesting unchecked domains only"
            ));
        }
        self.logger.info(&format!(
            "Checked {} domains ({failed} failed), {} available within {max_price}",
            answered.len(),
            found.len()
        ));

        found.sort_by(|a, b| a.price.total_cmp(&b.price));
        found.truncate(MAX_SUGGESTIONS);

        // Anything the registrar never answered for is still a candidate.
        if let Some(first_tld) = tlds.first() {
            for keyword in keywords {
                if found.len() >= MAX_SUGGESTIONS {
                    break;
                }
                let domain = format!("{keyword}.{first_tld}");
                if answered.contains(&domain) || found.iter().any(|s| s.domain == domain) {
                    continue;
                }
                found.push(DomainSuggestion {
                    domain,
                    available: false,
                    price: max_price,
                });
            }
        }
        found
    }

    async fn run(&self) -> Result<StageOutput> {
        if self.store.exists(paths::DOMAIN_NAMES).await? {
            return Ok(StageOutput::skip(format!("{} already exists", paths::DOMAIN_NAMES)));
        }
        let registrar = self
            .registrar
            .as_deref()
            .ok_or_else(|| BlogflowError::config("domain registrar credentials are not configured"))?;

        let keywords = self.load_keywords().await?;
        self.logger.debug(&format!("Generated {} keywords", keywords.len()));

        let suggestions = self.suggest(registrar, &keywords).await;
        storage::write_json(self.store.as_ref(), paths::DOMAIN_NAMES, &suggestions).await?;

        self.logger.info(&format!("Wrote {} domain suggestions", suggestions.len()));
        Ok(StageOutput::ok_value("count", serde_json::json!(suggestions.len())))
    }
}

#[async_trait]
impl Stage for DomainNameStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, _trigger: &Trigger) -> StageOutput {
        match self.run().await {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(&format!("Domain suggestion failed ({:?}): {e}", e.kind()));
                StageOutput::fail(e.to_string())
            }
        }
    }
}
