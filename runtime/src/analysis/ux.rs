//! UX signals: forms, accessibility, interactivity, media and social links.

use brand_audit::{
    AccessibilitySignals, FormSignals, InteractivitySignals, MediaSignals, UxFeatures,
};
use scraper::Html;
use url::Url;

use super::{count, select};

const SOCIAL_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "pinterest.com",
];

pub fn extract_ux(document: &Html) -> UxFeatures {
    UxFeatures {
        forms: forms(document),
        accessibility: accessibility(document),
        interactivity: interactivity(document),
        media: MediaSignals {
            images: count(document, "img"),
            videos: count(document, "video"),
            audio: count(document, "audio"),
            iframes: count(document, "iframe"),
        },
        has_social_links: has_social_links(document),
    }
}

fn forms(document: &Html) -> FormSignals {
    FormSignals {
        count: count(document, "form"),
        has_validation: count(
            document,
            "form [required], form [pattern], form [minlength], form [maxlength], \
             form input[type=email], form input[type=tel], form input[type=url]",
        ) > 0,
        has_labels: count(
            document,
            "form label, form input[aria-label], form textarea[aria-label], form select[aria-label]",
        ) > 0,
    }
}

fn accessibility(document: &Html) -> AccessibilitySignals {
    let images = select(document, "img");
    let alt_text_coverage = if images.is_empty() {
        1.0
    } else {
        let with_alt = images
            .iter()
            .filter(|img| {
                img.value()
                    .attr("alt")
                    .is_some_and(|alt| !alt.trim().is_empty())
            })
            .count();
        let ratio = with_alt as f64 / images.len() as f64;
        (ratio * 1000.0).round() / 1000.0
    };

    AccessibilitySignals {
        alt_text_coverage,
        valid_heading_structure: count(document, "h1") == 1,
        has_aria_labels: count(document, "[aria-label], [aria-labelledby]") > 0,
    }
}

fn interactivity(document: &Html) -> InteractivitySignals {
    InteractivitySignals {
        buttons: count(
            document,
            "button, input[type=button], input[type=submit], [role=button]",
        ),
        dropdowns: count(
            document,
            "select, [aria-haspopup=true], [aria-haspopup=menu], [class~=dropdown]",
        ),
        modals: count(
            document,
            "dialog, [role=dialog], [aria-modal=true], [class~=modal]",
        ),
        carousels: count(
            document,
            "[aria-roledescription=carousel], [class~=carousel], [class~=slider], [class~=swiper]",
        ),
    }
}

fn has_social_links(document: &Html) -> bool {
    select(document, "a[href]").iter().any(|a| {
        a.value()
            .attr("href")
            .and_then(|href| Url::parse(href).ok())
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
            .is_some_and(|host| {
                SOCIAL_HOSTS.iter().any(|social| {
                    host == *social || host.ends_with(&format!(".{social}"))
                })
            })
    })
}
