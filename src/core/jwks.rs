//! JWKS cache - chiavi di firma dell'identity provider
//!
//! Le chiavi sono cercate per `kid`. Una cache remota si aggiorna quando le
//! chiavi sono più vecchie del TTL configurato o quando arriva un `kid`
//! sconosciuto, mai più spesso di [`MIN_REFRESH_INTERVAL`]. Se l'aggiornamento
//! fallisce si continua a usare l'ultimo key set valido.

use crate::core::auth::AuthError;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

pub const MIN_REFRESH_INTERVAL: TimeDelta = TimeDelta::seconds(30);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

enum KeySource {
    Remote { client: reqwest::Client, url: String },
    Static,
}

#[derive(Default)]
struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
}

impl CachedKeys {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.fetched_at.is_some_and(|at| now - at < ttl)
    }

    fn attempted_recently(&self, now: DateTime<Utc>) -> bool {
        self.last_attempt
            .is_some_and(|at| now - at < MIN_REFRESH_INTERVAL)
    }
}

pub struct JwksCache {
    source: KeySource,
    ttl: TimeDelta,
    cache: RwLock<CachedKeys>,
}

impl JwksCache {
    /// Cache basata su un documento JWKS remoto, scaricato alla prima ricerca
    pub fn remote(url: impl Into<String>, ttl: TimeDelta) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            source: KeySource::Remote {
                client,
                url: url.into(),
            },
            ttl,
            cache: RwLock::new(CachedKeys::default()),
        })
    }

    /// Key set fisso, mai aggiornato
    pub fn from_static(keys: HashMap<String, DecodingKey>) -> Self {
        Self {
            source: KeySource::Static,
            ttl: TimeDelta::MAX,
            cache: RwLock::new(CachedKeys {
                keys,
                fetched_at: Some(Utc::now()),
                last_attempt: None,
            }),
        }
    }

    #[instrument(skip(self))]
    pub async fn find(&self, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
        let KeySource::Remote { client, url } = &self.source else {
            return Ok(self.cache.read().await.keys.get(kid).cloned());
        };

        {
            let cached = self.cache.read().await;
            let now = Utc::now();
            if let Some(key) = cached.keys.get(kid) {
                if cached.is_fresh(now, self.ttl) || cached.attempted_recently(now) {
                    return Ok(Some(key.clone()));
                }
            } else if cached.attempted_recently(now) {
                return lookup(&cached, kid);
            }
        }

        self.refresh(client, url).await?;
        lookup(&*self.cache.read().await, kid)
    }

    async fn refresh(&self, client: &reqwest::Client, url: &str) -> Result<(), AuthError> {
        let mut cached = self.cache.write().await;
        let now = Utc::now();
        // un'altra richiesta può aver già aggiornato mentre questa aspettava il lock
        if cached.attempted_recently(now) {
            return Ok(());
        }
        cached.last_attempt = Some(now);

        match fetch_jwk_set(client, url).await {
            Ok(set) => {
                cached.keys = keys_from_jwk_set(&set);
                cached.fetched_at = Some(Utc::now());
                info!("Loaded {} signing keys from {}", cached.keys.len(), url);
                Ok(())
            }
            Err(e) if cached.keys.is_empty() => {
                error!("Failed to fetch signing keys from {}: {:?}", url, e);
                Err(AuthError::keys_unavailable())
            }
            Err(e) => {
                warn!("Failed to refresh signing keys from {}, keeping stale set: {:?}", url, e);
                Ok(())
            }
        }
    }
}

fn lookup(cached: &CachedKeys, kid: &str) -> Result<Option<DecodingKey>, AuthError> {
    if cached.fetched_at.is_none() {
        return Err(AuthError::keys_unavailable());
    }
    Ok(cached.keys.get(kid).cloned())
}

async fn fetch_jwk_set(client: &reqwest::Client, url: &str) -> Result<JwkSet, reqwest::Error> {
    debug!("Fetching JWKS document");
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<JwkSet>()
        .await
}

/// Tiene ogni chiave che ha un `kid` e può diventare una `DecodingKey`
pub fn keys_from_jwk_set(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let Some(kid) = jwk.common.key_id.clone() else {
                debug!("Skipping JWK without kid");
                return None;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    warn!("Skipping unusable JWK {}: {:?}", kid, e);
                    None
                }
            }
        })
        .collect()
}
