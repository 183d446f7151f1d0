use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::page::{absolutize, PageContext};

const DOUYIN_DOMAIN: &str = "douyin.com";
const BILIBILI_DOMAIN: &str = "bilibili.com";
const MODAL_ID_PARAM: &str = "modal_id";
const VIDEO_PATH_PREFIX: &str = "/video/";

static AWEME_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""aweme_id"\s*:\s*"(\d+)""#).unwrap());
static AWEME_ID_CAMEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""awemeId"\s*:\s*"(\d+)""#).unwrap());

/// Pick the best content URL for a page.
///
/// Total function: platform heuristics and metadata fallbacks are tried in
/// priority order, and whatever goes wrong the page's own URL comes back
/// unchanged. The winner is re-validated as absolute http(s) before it is
/// allowed to replace the current URL.
pub fn resolve(context: &PageContext) -> String {
    let current = context.current_url.as_str();
    let Ok(url) = Url::parse(current) else {
        return context.current_url.clone();
    };

    let best = platform_override(context, &url)
        .or_else(|| metadata_fallback(context, current));

    match best {
        Some(candidate) if is_absolute_http(&candidate) => candidate,
        _ => context.current_url.clone(),
    }
}

fn platform_override(context: &PageContext, url: &Url) -> Option<String> {
    let host = url.host_str()?;

    if host_matches(host, DOUYIN_DOMAIN) {
        return douyin_override(context, url);
    }

    // bilibili video pages are already canonical up to query and fragment.
    if host_matches(host, BILIBILI_DOMAIN) && url.path().starts_with(VIDEO_PATH_PREFIX) {
        return Some(format!(
            "{}{}",
            url.origin().ascii_serialization(),
            url.path()
        ));
    }

    None
}

/// douyin rules, strongest signal first: a `modal_id` query parameter wins
/// outright; on listing pages the embedded state blob is searched for an
/// aweme id, then anchors are scanned for video links.
fn douyin_override(context: &PageContext, url: &Url) -> Option<String> {
    let modal_id = url
        .query_pairs()
        .find(|(key, _)| key == MODAL_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty());
    if let Some(id) = modal_id {
        if !url.path().starts_with(VIDEO_PATH_PREFIX) {
            return Some(douyin_video_url(&id));
        }
    }

    if !is_listing_path(url.path()) {
        return None;
    }

    if let Some(id) = context.embedded_state.as_deref().and_then(embedded_aweme_id) {
        return Some(douyin_video_url(&id));
    }

    longest_video_anchor(context, url)
}

fn is_listing_path(path: &str) -> bool {
    path == "/" || path.starts_with("/user/")
}

fn douyin_video_url(id: &str) -> String {
    format!("https://www.douyin.com/video/{id}")
}

fn embedded_aweme_id(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    AWEME_ID_RE
        .captures(&decoded)
        .or_else(|| AWEME_ID_CAMEL_RE.captures(&decoded))
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Scan anchors for douyin video or live links and keep the longest one;
/// longer URLs are the more specific ones on this platform. Malformed hrefs
/// are skipped. The first candidate wins a length tie.
fn longest_video_anchor(context: &PageContext, base: &Url) -> Option<String> {
    let mut candidates: Vec<String> = Vec::new();
    for href in &context.anchor_hrefs {
        let Some(abs) = absolutize(Some(base), href) else {
            continue;
        };
        if !abs.contains("douyin.com/video/") && !abs.contains("live.douyin.com/") {
            continue;
        }
        if candidates.contains(&abs) {
            continue;
        }
        candidates.push(abs);
    }
    candidates
        .into_iter()
        .reduce(|best, candidate| {
            if candidate.len() > best.len() {
                candidate
            } else {
                best
            }
        })
}

/// Generic fallback: prefer a metadata URL only when it is strictly longer
/// than the current one and carries the video path marker.
fn metadata_fallback(context: &PageContext, current: &str) -> Option<String> {
    let more_specific = |candidate: &&str| {
        candidate.len() > current.len() && candidate.contains(VIDEO_PATH_PREFIX)
    };
    context
        .open_graph_url
        .as_deref()
        .filter(more_specific)
        .or_else(|| context.canonical_url.as_deref().filter(more_specific))
        .map(str::to_string)
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn is_absolute_http(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
