//! Structural analysis of acquired HTML.
//!
//! Everything here is a pure function of the HTML and its base URL: no
//! I/O, no rendering. The parsed document never outlives the call, so the
//! results can cross `await` points freely.

pub mod structure;
pub mod text;
pub mod ux;

use brand_audit::SiteAnalysis;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Everything extracted from one page in a single parse.
#[derive(Debug, Clone, Default)]
pub struct PageAnalysis {
    /// `<title>`, or `og:title` when the title is missing.
    pub title: Option<String>,
    /// Visible text with markup, scripts and styles removed.
    pub text: String,
    pub site: SiteAnalysis,
}

/// Parse `html` once and extract title, visible text, structure and UX signals.
pub fn analyze_page(html: &str, base: &Url) -> PageAnalysis {
    let document = Html::parse_document(html);
    let text = text::visible_text(&document);

    let site = SiteAnalysis {
        structure: structure::extract_structure(&document, base, &text),
        ux: ux::extract_ux(&document),
    };

    PageAnalysis {
        title: page_title(&document),
        text,
        site,
    }
}

fn page_title(document: &Html) -> Option<String> {
    let title = select(document, "title")
        .first()
        .map(|el| text::collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    title.or_else(|| {
        select(document, r#"meta[property="og:title"]"#)
            .first()
            .and_then(|el| el.value().attr("content"))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// All elements matching `css`, in document order. An invalid selector
/// matches nothing.
pub(crate) fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => document.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

pub(crate) fn count(document: &Html, css: &str) -> u32 {
    match Selector::parse(css) {
        Ok(sel) => document.select(&sel).count() as u32,
        Err(_) => 0,
    }
}
