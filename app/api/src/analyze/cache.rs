use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use framework::json::to_json;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::info;

use super::model::PrContext;
use super::model::PullRequest;

/// In-memory cache of analysis results keyed by the shape of the pull request.
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

struct CacheEntry {
    context: PrContext,
    created_at: Instant,
    pr_title: String,
}

#[derive(Serialize, Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub ttl_seconds: u64,
    pub entries: Vec<CacheEntryStats>,
}

#[derive(Serialize, Debug)]
pub struct CacheEntryStats {
    pub key: String,
    pub age_seconds: u64,
    pub pr_title: String,
}

// fields in alphabetical order, serialized as the canonical key input
#[derive(Serialize, Debug)]
struct CacheKeyInput<'a> {
    files: usize,
    sample_files: Vec<&'a str>,
    title: &'a str,
    total_additions: u64,
    total_deletions: u64,
}

pub fn cache_key(pr: &PullRequest) -> String {
    let input = CacheKeyInput {
        files: pr.files.len(),
        sample_files: pr.files.iter().take(3).map(|file| file.filename.as_str()).collect(),
        title: &pr.title,
        total_additions: pr.files.iter().map(|file| u64::from(file.additions)).sum(),
        total_deletions: pr.files.iter().map(|file| u64::from(file.deletions)).sum(),
    };
    // serializing plain strings and integers cannot fail
    let json = to_json(&input).unwrap_or_default();
    let digest = hex::encode(Sha256::digest(json.as_bytes()));
    digest[..16].to_string()
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        info!("analysis cache initialized, ttl={}s", ttl.as_secs());
        AnalysisCache {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, pr: &PullRequest) -> Option<PrContext> {
        let key = cache_key(pr);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let Some(entry) = entries.get(&key) else {
            debug!("cache miss, key={key}");
            return None;
        };

        let age = entry.created_at.elapsed();
        if age > self.ttl {
            info!("cache expired, key={key}, age={:.1}s", age.as_secs_f64());
            entries.remove(&key);
            return None;
        }

        info!("cache hit, key={key}, age={:.1}s", age.as_secs_f64());
        Some(entry.context.clone())
    }

    pub fn set(&self, pr: &PullRequest, context: PrContext) {
        let key = cache_key(pr);
        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.insert(
                key.clone(),
                CacheEntry {
                    context,
                    created_at: Instant::now(),
                    pr_title: pr.title.clone(),
                },
            );
        }
        info!("cached analysis, key={key}, title={}", pr.title);
        self.sweep();
    }

    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, entry| {
            let expired = entry.created_at.elapsed() > self.ttl;
            if expired {
                debug!("remove expired cache entry, key={key}");
            }
            !expired
        });
        before - entries.len()
    }

    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let count = entries.len();
        entries.clear();
        info!("cache cleared, removed={count}");
        count
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut stats: Vec<CacheEntryStats> = entries
            .iter()
            .map(|(key, entry)| CacheEntryStats {
                key: key.clone(),
                age_seconds: entry.created_at.elapsed().as_secs(),
                pr_title: entry.pr_title.clone(),
            })
            .collect();
        stats.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            total_entries: entries.len(),
            ttl_seconds: self.ttl.as_secs(),
            entries: stats,
        }
    }
}
