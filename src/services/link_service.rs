//! Link service
//!
//! Ties the alias generator, link record store, dedup index and statistics
//! aggregator together. HTTP handlers call into this service only.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analytics::{EffectDispatcher, EffectHandler, LinkEvent};
use crate::config::StaticConfig;
use crate::errors::{KurzError, Result};
use crate::models::{EventStats, InteractionType, LinkRecord, UserStats};
use crate::services::alias::AliasGenerator;
use crate::services::dedup_index::DedupIndex;
use crate::services::link_store::LinkStore;
use crate::services::stats::StatsAggregator;
use crate::store::KvStore;
use crate::utils::url_validator::normalize_url;

// ============ Request DTOs ============

/// Request to shorten a URL
#[derive(Debug, Clone)]
pub struct ShortenRequest {
    /// Raw URL as received (scheme optional)
    pub url: String,
    pub user_id: String,
    pub event_id: String,
    pub interaction: InteractionType,
}

/// Result of a shorten call
#[derive(Debug, Clone)]
pub struct ShortenResult {
    pub link: LinkRecord,
    /// False when an existing link for the same (user, type, url) was returned
    pub created: bool,
}

// ============ LinkService Implementation ============

pub struct LinkService {
    links: LinkStore,
    dedup: DedupIndex,
    stats: StatsAggregator,
    aliases: AliasGenerator,
    dispatcher: Arc<EffectDispatcher>,
    default_scheme: String,
}

impl LinkService {
    /// Build the service and start its side-effect dispatcher
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn KvStore>, config: &StaticConfig) -> Self {
        let links = LinkStore::new(store.clone(), config.shortener.public_base());
        let stats = StatsAggregator::new(store.clone());
        let dispatcher = EffectDispatcher::start(
            EffectHandler::new(links.clone(), stats.clone()),
            &config.dispatcher,
        );

        Self {
            links,
            dedup: DedupIndex::new(store),
            stats,
            aliases: AliasGenerator::new(
                config.shortener.alias_length,
                config.shortener.max_alias_attempts,
            ),
            dispatcher,
            default_scheme: config.shortener.default_scheme.clone(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<EffectDispatcher> {
        &self.dispatcher
    }

    /// Shorten a URL, reusing the existing alias for a repeated (user, type, url)
    ///
    /// The link record and dedup entry are written before returning; the
    /// statistics update is dispatched in the background.
    pub async fn shorten(&self, req: ShortenRequest) -> Result<ShortenResult> {
        let long_url = normalize_url(&req.url, &self.default_scheme)?;
        let mut stale_entry = false;

        match self
            .dedup
            .lookup(&req.user_id, &req.interaction, &long_url)
            .await
        {
            Ok(alias) => match self.links.get(&alias).await {
                Ok(link) => {
                    debug!("Dedup hit for {} -> {}", long_url, alias);
                    return Ok(ShortenResult {
                        link,
                        created: false,
                    });
                }
                Err(KurzError::NotFound(_)) => {
                    // 去重项指向的记录写入失败，重新生成
                    warn!(
                        "Dedup entry points to missing link {}, creating a new one",
                        alias
                    );
                    stale_entry = true;
                }
                Err(e) => return Err(e),
            },
            Err(KurzError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let alias = self.aliases.generate(&self.links).await?;
        let link = self
            .links
            .put(
                &alias,
                &long_url,
                &req.event_id,
                &req.user_id,
                req.interaction.clone(),
            )
            .await?;

        let recorded = if stale_entry {
            self.dedup
                .replace(&req.user_id, &req.interaction, &long_url, &alias)
                .await?;
            true
        } else {
            self.dedup
                .record(&req.user_id, &req.interaction, &long_url, &alias)
                .await?
        };

        if !recorded {
            // 并发请求抢先写入了去重项，以先写入者为准
            let winner = match self
                .dedup
                .lookup(&req.user_id, &req.interaction, &long_url)
                .await
            {
                Ok(winner) => match self.links.get(&winner).await {
                    Ok(existing) => {
                        warn!(
                            "Concurrent shorten for {} won by {}, alias {} left orphaned",
                            long_url, winner, alias
                        );
                        return Ok(ShortenResult {
                            link: existing,
                            created: false,
                        });
                    }
                    Err(KurzError::NotFound(_)) => winner,
                    Err(e) => return Err(e),
                },
                Err(KurzError::NotFound(_)) => String::new(),
                Err(e) => return Err(e),
            };
            // 抢先者的记录不可用，去重项改指向本次生成的短码
            warn!(
                "Dedup entry for {} points to missing link '{}', taking over with {}",
                long_url, winner, alias
            );
            self.dedup
                .replace(&req.user_id, &req.interaction, &long_url, &alias)
                .await?;
        }

        self.dispatcher.dispatch(LinkEvent::Created(link.clone()));
        info!(
            "Created link {} -> {} (user '{}', event '{}', type '{}')",
            link.key, link.long_url, link.user_id, link.event_id, link.interaction
        );

        Ok(ShortenResult {
            link,
            created: true,
        })
    }

    /// Resolve an alias for redirection and record the click in the background
    ///
    /// The returned record carries the click count as read, before this click.
    pub async fn resolve(&self, alias: &str) -> Result<LinkRecord> {
        let link = self.links.get(alias).await?;
        self.dispatcher.dispatch(LinkEvent::Clicked(link.clone()));
        Ok(link)
    }

    /// Look up an alias without touching any counter
    pub async fn info(&self, alias: &str) -> Result<LinkRecord> {
        self.links.get(alias).await
    }

    /// All known links, newest first, optionally truncated to `limit`
    ///
    /// Scans the whole key space; only suitable for small deployments.
    pub async fn latest(&self, limit: Option<usize>) -> Result<Vec<LinkRecord>> {
        let aliases = self.links.aliases().await?;
        let mut records = Vec::with_capacity(aliases.len());

        for alias in aliases {
            match self.links.get(&alias).await {
                Ok(record) => records.push(record),
                Err(KurzError::NotFound(_)) => {
                    debug!("Skipping incomplete link {}", alias);
                }
                Err(e) => return Err(e),
            }
        }

        records.sort_by(|a, b| {
            b.creation_date
                .cmp(&a.creation_date)
                .then_with(|| a.key.cmp(&b.key))
        });
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        self.stats.user_stats(user_id).await
    }

    pub async fn event_stats(&self, event_id: &str) -> Result<EventStats> {
        self.stats.event_stats(event_id).await
    }
}
