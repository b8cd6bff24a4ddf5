//! End-to-end pipeline tests against mock HTTP servers.
//!
//! One `MockServer` plays the audited website (and the render proxy), a
//! second one plays the OpenAI-compatible model endpoint.

use std::path::PathBuf;

use brand_audit::{catalog, Change, Provenance, SiteCategory};
use brand_audit_runtime::config::{AuditConfig, ModelConfig, ProxyConfig};
use brand_audit_runtime::store::{AuditStore, SqliteAuditStore};
use brand_audit_runtime::{compare_audits, Auditor};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn site_html() -> String {
    format!(
        r#"<!doctype html><html><head><title>Acme Outfitters</title></head><body>
        <header><nav>
          <a href="/">Home</a><a href="/products">Products</a><a href="/blog">Blog</a>
          <a href="/about">About us</a>
        </nav></header>
        <main>
          <h1>Gear for every trail</h1>
          <img src="/hero.jpg" alt="Hikers on a ridge"><img src="/badge.png">
          <p>{}</p>
          <form action="/newsletter"><label for="e">Email</label>
            <input id="e" type="email" required><button>Subscribe</button></form>
        </main>
        <footer><a href="https://www.instagram.com/acme">Instagram</a>
          <a href="mailto:hello@acme.test">Email</a></footer>
        </body></html>"#,
        "Shop durable packs, tents and boots. ".repeat(20)
    )
}

fn json_verdict() -> String {
    let sections: Vec<_> = catalog::CATALOG
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            json!({
                "name": spec.name,
                "score": 60 + i * 3,
                "issues": 3,
                "recommendations": 4,
                "details": format!("Notes on {}", spec.name),
            })
        })
        .collect();
    let body = json!({
        "overallScore": 75,
        "summary": "A clear outdoor brand with room to grow.",
        "sections": sections,
    });
    format!("Here is the audit:\n```json\n{body}\n```")
}

async fn mount_model(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })))
        .mount(server)
        .await;
}

fn config(model: Option<&MockServer>, proxy: Option<&MockServer>) -> AuditConfig {
    AuditConfig {
        model: model.map(|m| ModelConfig {
            api_key: "sk-test".into(),
            base_url: format!("{}/v1", m.uri()),
            model: "mock-model".into(),
        }),
        proxy: proxy.map(|p| ProxyConfig {
            endpoint: format!("{}/render", p.uri()),
            api_key: None,
        }),
        db_path: PathBuf::from("unused.db"),
        fetch_timeout_ms: 5_000,
        model_timeout_ms: 5_000,
        deadline_ms: 30_000,
        ..AuditConfig::default()
    }
}

#[tokio::test]
async fn external_verdict_flows_into_audit() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(site_html(), "text/html"))
        .mount(&site)
        .await;
    let model = MockServer::start().await;
    mount_model(&model, &json_verdict()).await;

    let auditor = Auditor::from_config(&config(Some(&model), None));
    let audit = auditor.generate_audit(&site.uri()).await.unwrap();

    assert_eq!(audit.title, "Acme Outfitters");
    assert_eq!(audit.sections.len(), 10);
    assert_eq!(audit.sections[0].score, 60.0);
    assert_eq!(audit.sections[9].score, 87.0);
    assert_eq!(audit.sections[2].detail, "Notes on Visual Identity & Design");

    let meta = &audit.metadata;
    assert_eq!(meta.provenance, Provenance::External);
    assert_eq!(meta.provider.as_deref(), Some("mock-model"));
    assert_eq!(meta.reported_overall, Some(75.0));
    assert_eq!(meta.acquisition_strategy.as_deref(), Some("direct"));
    assert_eq!(meta.category, SiteCategory::Ecommerce);

    let expected: f64 = audit.sections.iter().map(|s| s.score * s.weight).sum();
    assert!((audit.overall_score - expected).abs() < 0.05);

    let structure = meta.site_structure.as_ref().unwrap();
    assert_eq!(structure.discovered_pages.len(), 4);
    assert!(structure.content.has_blog);
    assert_eq!(structure.navigation.menu_items.len(), 4);

    let ux = meta.ux_features.as_ref().unwrap();
    assert_eq!(ux.accessibility.alt_text_coverage, 0.5);
    assert!(ux.accessibility.valid_heading_structure);
    assert!(ux.forms.has_validation);
    assert!(ux.has_social_links);
}

#[tokio::test]
async fn blocked_site_is_fetched_through_plain_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/render"))
        .and(query_param("render_js", "true"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/render"))
        .and(query_param("render_js", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_string(site_html()))
        .expect(1)
        .mount(&server)
        .await;

    let auditor = Auditor::from_config(&config(None, Some(&server)));
    let audit = auditor.generate_audit(&server.uri()).await.unwrap();

    assert_eq!(audit.metadata.acquisition_strategy.as_deref(), Some("proxy(plain)"));
    assert_eq!(audit.metadata.provenance, Provenance::Synthetic);
    assert_eq!(
        audit.metadata.fallback_reason.as_deref(),
        Some("no model credential configured")
    );
    assert!(audit.metadata.site_structure.is_some());
}

#[tokio::test]
async fn model_failure_degrades_to_synthetic() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(site_html(), "text/html"))
        .mount(&site)
        .await;
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("prompt rejected"))
        .expect(1)
        .mount(&model)
        .await;

    let auditor = Auditor::from_config(&config(Some(&model), None));
    let audit = auditor.generate_audit(&site.uri()).await.unwrap();

    assert_eq!(audit.metadata.provenance, Provenance::Synthetic);
    assert!(audit
        .metadata
        .fallback_reason
        .as_deref()
        .unwrap()
        .contains("HTTP 400"));
    assert_eq!(audit.metadata.reported_overall, None);
}

#[tokio::test]
async fn saved_audits_compare_in_order() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(site_html(), "text/html"))
        .mount(&site)
        .await;

    let first_model = MockServer::start().await;
    mount_model(&first_model, "**Overall: 60/100**\n1. Brand – 6/10").await;
    let second_model = MockServer::start().await;
    mount_model(&second_model, "**Overall: 61/100**\n1. Brand – 6.5/10").await;

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteAuditStore::open(&dir.path().join("audits.db")).unwrap();

    let before = Auditor::from_config(&config(Some(&first_model), None))
        .generate_audit(&site.uri())
        .await
        .unwrap();
    store.put(&before).unwrap();
    let after = Auditor::from_config(&config(Some(&second_model), None))
        .generate_audit(&site.uri())
        .await
        .unwrap();
    store.put(&after).unwrap();

    let history = store.history_for_url(&before.url, 3).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, before.id);

    let comparison = compare_audits(&history).unwrap();
    assert_eq!(comparison.overall_trend[0], None);
    assert_eq!(comparison.section_deltas[0].scores, vec![60.0, 65.0]);
    assert_eq!(comparison.section_deltas[0].changes, vec![Change::Increase(5.0)]);
    assert_eq!(comparison.section_deltas[1].changes, vec![Change::NoChange]);
}

#[tokio::test]
async fn invalid_url_is_the_only_hard_failure() {
    let auditor = Auditor::from_config(&config(None, None));
    let err = auditor.generate_audit("not a url at all").await.unwrap_err();
    assert!(matches!(err, brand_audit::AuditError::InvalidUrl(_)));
}
