//! Web-search signal provider — carrier disruption news, weather, etc.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[async_trait]
pub trait SignalSearch: Send + Sync {
    async fn search(&self, query: &str) -> std::io::Result<Vec<SignalHit>>;
}

/// No-signal provider. Real deployments plug a search API in here.
#[derive(Debug, Default)]
pub struct MockSearch;

#[async_trait]
impl SignalSearch for MockSearch {
    async fn search(&self, _query: &str) -> std::io::Result<Vec<SignalHit>> {
        Ok(Vec::new())
    }
}

/// Render search hits as a prompt-ready context block. `None` when there is
/// nothing to say.
pub fn format_hits(query: &str, hits: &[SignalHit]) -> Option<String> {
    if hits.is_empty() {
        return None;
    }
    let mut block = format!("Recent web search results for '{query}':\n");
    for hit in hits {
        block.push_str(&format!("- {}: {}\n", hit.title, hit.snippet));
    }
    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_search_returns_no_hits() {
        assert!(MockSearch.search("FedEx delays").await.unwrap().is_empty());
    }

    #[test]
    fn formatting_skips_empty_hit_lists() {
        assert!(format_hits("q", &[]).is_none());
        let hits = vec![SignalHit {
            title: "Storm slows parcels".into(),
            url: "https://news.example.com/storm".into(),
            snippet: "Carriers report two-day delays".into(),
        }];
        let block = format_hits("FedEx delays", &hits).unwrap();
        assert!(block.contains("Storm slows parcels"));
        assert!(block.contains("two-day delays"));
    }
}
