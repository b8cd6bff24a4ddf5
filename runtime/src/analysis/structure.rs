//! Site structure: discovered pages, navigation and content layout.

use std::collections::HashSet;
use std::sync::OnceLock;

use brand_audit::{ContentStructure, NavigationSummary, SiteStructure};
use regex::Regex;
use scraper::Html;
use url::Url;

use super::text::collapse_whitespace;
use super::{count, select};

/// Upper bound on same-origin pages kept from one document.
pub const MAX_DISCOVERED_PAGES: usize = 10;

const MAX_MENU_ITEMS: usize = 20;

pub fn extract_structure(document: &Html, base: &Url, visible_text: &str) -> SiteStructure {
    SiteStructure {
        discovered_pages: discover_pages(document, base),
        navigation: navigation(document),
        content: content_structure(document, visible_text),
    }
}

/// Same-origin http(s) links, resolved against `base`, fragment-free,
/// deduplicated in first-seen order and capped at [`MAX_DISCOVERED_PAGES`].
pub fn discover_pages(document: &Html, base: &Url) -> Vec<String> {
    let origin = base.origin();
    let mut seen = HashSet::new();
    let mut pages = Vec::new();

    for element in select(document, "a[href]") {
        let href = element.value().attr("href").unwrap_or("").trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }
        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        // mailto:, tel:, javascript: and friends all fall out here.
        if !matches!(resolved.scheme(), "http" | "https") || resolved.origin() != origin {
            continue;
        }
        resolved.set_fragment(None);

        let url = resolved.to_string();
        if seen.insert(url.clone()) {
            pages.push(url);
            if pages.len() == MAX_DISCOVERED_PAGES {
                break;
            }
        }
    }

    pages
}

fn navigation(document: &Html) -> NavigationSummary {
    let mut links = select(document, "nav a, [role=navigation] a");
    if links.is_empty() {
        links = select(document, "header a");
    }

    let mut seen = HashSet::new();
    let menu_items = links
        .iter()
        .map(|a| collapse_whitespace(&a.text().collect::<String>()))
        .filter(|label| !label.is_empty() && seen.insert(label.to_lowercase()))
        .take(MAX_MENU_ITEMS)
        .collect();

    let has_search = count(
        document,
        "input[type=search], [role=search], input[name=q], input[name=s], input[name=search]",
    ) > 0;

    let has_locale_selector = count(
        document,
        "a[hreflang], select[name*=lang], select[id*=lang], \
         [class*=language-switch], [class*=lang-select], [class*=locale]",
    ) > 0;

    NavigationSummary {
        menu_items,
        has_search,
        has_locale_selector,
    }
}

/// Heading levels in document order plus keyword flags over `visible_text`.
///
/// The flags are a heuristic: a page mentioning "our blog" in a footer
/// counts as having a blog.
fn content_structure(document: &Html, visible_text: &str) -> ContentStructure {
    let heading_levels = select(document, "h1, h2, h3, h4, h5, h6")
        .iter()
        .filter_map(|h| h.value().name().strip_prefix('h')?.parse::<u8>().ok())
        .collect();

    let k = keywords();
    ContentStructure {
        heading_levels,
        has_contact: k.contact.is_match(visible_text),
        has_about: k.about.is_match(visible_text),
        has_blog: k.blog.is_match(visible_text),
        has_products: k.products.is_match(visible_text),
    }
}

struct Keywords {
    contact: Regex,
    about: Regex,
    blog: Regex,
    products: Regex,
}

fn keywords() -> &'static Keywords {
    static KEYWORDS: OnceLock<Keywords> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        let build = |pattern: &str| {
            Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).expect("valid keyword regex")
        };
        Keywords {
            contact: build(r"contact|get in touch|reach us|email us"),
            about: build(r"about us|about|our story|who we are|our team"),
            blog: build(r"blog|news|articles|insights|journal"),
            products: build(r"products?|shop|store|add to cart|buy now|pricing|catalog"),
        }
    })
}
