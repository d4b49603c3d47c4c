//! Scenario tests for the response cache under a paused clock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use vidgate::cache::ResponseCache;
use vidgate::types::{DomainPayload, VideoMeta, VideoPage};

fn video(tag: &str) -> DomainPayload {
    DomainPayload::Video(VideoMeta {
        video_id: tag.to_string(),
        title: format!("title {tag}"),
        channel_title: "channel".to_string(),
        thumbnail_url: None,
        published_at: None,
        embeddable: true,
    })
}

fn page(token: Option<&str>) -> DomainPayload {
    DomainPayload::Page(VideoPage {
        items: Vec::new(),
        next_page_token: token.map(str::to_string),
    })
}

#[tokio::test(start_paused = true)]
async fn per_entry_ttls_expire_independently() {
    let cache = ResponseCache::new(8);
    cache.put("short".to_string(), video("s"), Duration::from_secs(5));
    cache.put("long".to_string(), video("l"), Duration::from_secs(50));

    tokio::time::advance(Duration::from_secs(10)).await;
    assert!(cache.get("short").is_none());
    assert_eq!(cache.get("long"), Some(video("l")));
}

#[tokio::test(start_paused = true)]
async fn reads_do_not_extend_the_deadline() {
    let cache = ResponseCache::new(8);
    cache.put("k".to_string(), video("a"), Duration::from_secs(10));

    tokio::time::advance(Duration::from_secs(9)).await;
    assert!(cache.get("k").is_some());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(cache.get("k").is_none(), "the read at 9s must not refresh");
}

#[tokio::test(start_paused = true)]
async fn capacity_sequence_keeps_newest_live_entries() {
    let cache = ResponseCache::new(3);
    cache.put("a".to_string(), video("a"), Duration::from_secs(5));
    cache.put("b".to_string(), video("b"), Duration::from_secs(60));
    cache.put("c".to_string(), video("c"), Duration::from_secs(60));

    tokio::time::advance(Duration::from_secs(10)).await;

    // "a" has expired; "d" claims its slot without touching live entries.
    cache.put("d".to_string(), video("d"), Duration::from_secs(60));
    assert_eq!(cache.len(), 3);
    assert!(cache.get("b").is_some());

    // A further insert must evict the oldest live entry, which is "b".
    cache.put("e".to_string(), video("e"), Duration::from_secs(60));
    assert_eq!(cache.len(), 3);
    assert!(cache.get("b").is_none());
    assert!(cache.get("c").is_some());
    assert!(cache.get("d").is_some());
    assert!(cache.get("e").is_some());
}

#[tokio::test(start_paused = true)]
async fn prune_clears_expired_entries_without_reads() {
    let cache = ResponseCache::new(8);
    for key in ["a", "b", "c"] {
        cache.put(key.to_string(), video(key), Duration::from_secs(5));
    }
    cache.put("keeper".to_string(), page(Some("CAUQAA")), Duration::from_secs(60));

    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(cache.len(), 4, "expiry alone does not remove entries");

    cache.prune();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("keeper"), Some(page(Some("CAUQAA"))));
}

#[test]
fn both_payload_shapes_round_trip() {
    let cache = ResponseCache::new(8);
    cache.put("v".to_string(), video("a"), Duration::from_secs(60));
    cache.put("p".to_string(), page(None), Duration::from_secs(60));

    assert_eq!(cache.get("v"), Some(video("a")));
    assert_eq!(cache.get("p"), Some(page(None)));
}
