use scraper::{Html, Selector};
use url::Url;

/// Immutable snapshot of the active page, taken once per dispatch.
///
/// Hosts that only know the location fill `current_url` and leave the rest
/// empty; hosts that hold the raw document build the full snapshot via
/// [`PageContext::from_html`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
    pub current_url: String,
    pub canonical_url: Option<String>,
    pub open_graph_url: Option<String>,
    pub anchor_hrefs: Vec<String>,
    /// Raw embedded page state (still percent-encoded) when the platform
    /// ships one, e.g. a `#RENDER_DATA` JSON blob.
    pub embedded_state: Option<String>,
}

impl PageContext {
    pub fn new(current_url: impl Into<String>) -> Self {
        Self {
            current_url: current_url.into(),
            ..Self::default()
        }
    }

    /// Build a snapshot from a raw HTML document.
    ///
    /// Canonical link, Open Graph URL, and anchor hrefs are resolved to
    /// absolute URLs against `current_url`; values that cannot be resolved
    /// are dropped rather than kept relative. The embedded state blob is
    /// captured verbatim.
    pub fn from_html(current_url: impl Into<String>, html: &str) -> Self {
        let current_url = current_url.into();
        let base = Url::parse(&current_url).ok();
        let doc = Html::parse_document(html);

        let canonical_url = select_attr(&doc, "link[rel=\"canonical\"]", "href")
            .and_then(|href| absolutize(base.as_ref(), &href));

        // The property= form wins over name=, matching how pages usually tag it.
        let open_graph_url = select_attr(&doc, "meta[property=\"og:url\"]", "content")
            .or_else(|| select_attr(&doc, "meta[name=\"og:url\"]", "content"))
            .and_then(|content| absolutize(base.as_ref(), &content));

        let anchor_hrefs = Selector::parse("a[href]")
            .ok()
            .map(|sel| {
                doc.select(&sel)
                    .filter_map(|el| el.value().attr("href"))
                    .filter_map(|href| absolutize(base.as_ref(), href))
                    .collect()
            })
            .unwrap_or_default();

        let embedded_state = Selector::parse("#RENDER_DATA").ok().and_then(|sel| {
            doc.select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty())
        });

        Self {
            current_url,
            canonical_url,
            open_graph_url,
            anchor_hrefs,
            embedded_state,
        }
    }
}

fn select_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve `raw` to an absolute URL, joining against `base` when relative.
pub(crate) fn absolutize(base: Option<&Url>, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(Url::into)
}
