//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small marketplace (listing, product
//! and storefront pages) and run the crawl over plain HTTP end-to-end.

use meli_leads::config::{load_config_with_hash, parse_config, Config};
use meli_leads::crawler::{
    crawl_seed, run_crawl, Coordinator, Fetcher, HttpRenderer, RetryPolicy, WalkSettings,
};
use meli_leads::storage::{LeadStore, RunStatus, SqliteStorage};
use meli_leads::{Seed, SellerRecord};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn stack_listing(items: &[String], next: Option<String>) -> String {
    let links: String = items
        .iter()
        .map(|href| {
            format!(
                r#"<li><a class="ui-search-item__group__element ui-search-link" href="{href}">Produto</a></li>"#
            )
        })
        .collect();
    let next = next
        .map(|href| format!(r#"<a title="Seguinte" href="{href}">Seguinte</a>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><ol class="ui-search-layout ui-search-layout--stack">{links}</ol>{next}</body></html>"#
    )
}

fn product_page(storefront: Option<String>) -> String {
    let control = storefront
        .map(|href| {
            format!(
                r#"<a class="ui-pdp-media__action ui-box-component__action" href="{href}">Ver mais dados deste vendedor</a>"#
            )
        })
        .unwrap_or_else(|| "<p>Vendido e entregue pela plataforma</p>".to_string());
    format!("<html><body><h1>Produto</h1>{control}</body></html>")
}

fn storefront_page(name: &str, good: u64, neutral: u64, bad: u64) -> String {
    format!(
        r#"<html><body>
        <h3 id="store-info__name">{name}</h3>
        <p class="experience">3 anos vendendo no Mercado Livre</p>
        <p class="seller-info__subtitle-sales">+500 vendas nos últimos 4 meses</p>
        <p class="message__title">MercadoLíder</p>
        <p class="location-subtitle">Campinas, São Paulo</p>
        <span id="feedback_good">Bom ({good})</span>
        <span id="feedback_good">Regular ({neutral})</span>
        <span id="feedback_good">Ruim ({bad})</span>
        </body></html>"#
    )
}

/// Mounts two listing pages for `sao-paulo/eletronicos`: three products,
/// two with a storefront and one sold by the platform.
async fn mount_marketplace(server: &MockServer) {
    let base = server.uri();

    mount_page(
        server,
        "/sao-paulo/eletronicos",
        stack_listing(
            &[format!("{base}/p/1"), "/p/2".to_string()],
            Some(format!("{base}/sao-paulo/eletronicos_Desde_49")),
        ),
    )
    .await;
    mount_page(
        server,
        "/sao-paulo/eletronicos_Desde_49",
        stack_listing(&[format!("{base}/p/3")], None),
    )
    .await;

    mount_page(server, "/p/1", product_page(Some(format!("{base}/perfil/ACME")))).await;
    mount_page(server, "/p/2", product_page(Some("/perfil/BETA".to_string()))).await;
    mount_page(server, "/p/3", product_page(None)).await;

    mount_page(server, "/perfil/ACME", storefront_page("Acme Loja oficial", 120, 7, 3)).await;
    mount_page(server, "/perfil/BETA", storefront_page("Beta's", 10, 0, 1)).await;
}

fn http_fetcher() -> Fetcher<HttpRenderer> {
    Fetcher::new(
        HttpRenderer::new("meli-leads/test").unwrap(),
        RetryPolicy::new(1, Duration::ZERO),
        Duration::ZERO,
    )
}

fn test_config(root_url: &str, db_path: &str, seeds_path: &str) -> String {
    format!(
        r#"
[crawler]
root-url = "{root_url}"
max-pages = 2
pre-request-pause-ms = 0
retry-attempts = 2
retry-cooldown-ms = 0

[renderer]
kind = "http"

[seeds]
path = "{seeds_path}"

[warehouse]
database-path = "{db_path}"
country = "BR"
"#
    )
}

#[tokio::test]
async fn test_seed_yields_one_record_per_storefront() {
    let server = MockServer::start().await;
    mount_marketplace(&server).await;

    let fetcher = http_fetcher();
    let settings = WalkSettings::new(format!("{}/", server.uri()), 2);
    let seed = Seed::new("sao-paulo", "eletronicos");

    let mut records: Vec<SellerRecord> = Vec::new();
    let outcome = crawl_seed(&fetcher, &settings, &seed, |r| records.push(r))
        .await
        .unwrap();

    assert_eq!(outcome.listing_pages, 2);
    assert_eq!(outcome.items, 3);
    assert_eq!(outcome.items_without_storefront, 1);
    assert_eq!(records.len(), 2);

    let acme = &records[0];
    assert_eq!(acme.vendor_name(), "Acme");
    assert_eq!(acme.location_filter(), "sao-paulo");
    assert_eq!(acme.category(), "eletronicos");
    assert_eq!(acme.meli_url(), format!("{}/perfil/ACME", server.uri()));
    assert_eq!(acme.experience(), "3 anos");
    assert_eq!(acme.sales_count(), 500);
    assert_eq!(acme.sales_period(), "nos últimos 4 meses");
    assert_eq!(acme.status(), "MercadoLíder");
    assert_eq!(acme.location_meli(), "Campinas, São Paulo");
    assert_eq!(
        (acme.positive_ratings(), acme.neutral_ratings(), acme.negative_ratings()),
        (120, 7, 3)
    );

    let beta = &records[1];
    assert_eq!(beta.vendor_name(), "Betas");
    assert_eq!(beta.meli_url(), format!("{}/perfil/BETA", server.uri()));

    for record in &records {
        assert_eq!(
            record.total_ratings(),
            record.positive_ratings() + record.neutral_ratings() + record.negative_ratings()
        );
        assert_eq!(record.main_metric_1(), "");
        assert_eq!(record.main_metric_2(), "");
    }
}

#[tokio::test]
async fn test_single_page_two_storefronts() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/sao-paulo/eletronicos",
        stack_listing(&[format!("{base}/item/a"), format!("{base}/item/b")], None),
    )
    .await;
    mount_page(&server, "/item/a", product_page(Some(format!("{base}/loja/a")))).await;
    mount_page(&server, "/item/b", product_page(Some(format!("{base}/loja/b")))).await;
    mount_page(&server, "/loja/a", storefront_page("Loja A", 40, 2, 1)).await;
    mount_page(&server, "/loja/b", storefront_page("Loja B", 9, 0, 0)).await;

    let fetcher = http_fetcher();
    let settings = WalkSettings::new(format!("{base}/"), 2);
    let mut records = Vec::new();
    crawl_seed(
        &fetcher,
        &settings,
        &Seed::new("sao-paulo", "eletronicos"),
        |r| records.push(r),
    )
    .await
    .unwrap();

    assert_eq!(records.len(), 2);
    let urls: Vec<&str> = records.iter().map(|r| r.meli_url()).collect();
    assert_eq!(urls, vec![format!("{base}/loja/a"), format!("{base}/loja/b")]);
    assert_eq!(records[0].total_ratings(), 43);
    assert_eq!(records[1].total_ratings(), 9);
    for record in &records {
        assert_eq!(record.location_filter(), "sao-paulo");
        assert_eq!(record.category(), "eletronicos");
    }
}

#[tokio::test]
async fn test_product_without_storefront_yields_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/recife/moda",
        stack_listing(&[format!("{base}/p/direct")], None),
    )
    .await;
    mount_page(&server, "/p/direct", product_page(None)).await;

    let fetcher = http_fetcher();
    let settings = WalkSettings::new(format!("{base}/"), 2);

    let mut records = Vec::new();
    let outcome = crawl_seed(&fetcher, &settings, &Seed::new("recife", "moda"), |r| {
        records.push(r)
    })
    .await
    .unwrap();

    assert!(records.is_empty());
    assert_eq!(outcome.items, 1);
    assert_eq!(outcome.items_without_storefront, 1);
    assert_eq!(outcome.items_failed, 0);
}

#[tokio::test]
async fn test_coordinator_persists_leads() {
    let server = MockServer::start().await;
    mount_marketplace(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("leads.db");
    let config: Config = parse_config(&test_config(
        &format!("{}/", server.uri()),
        db_path.to_str().unwrap(),
        "unused.csv",
    ))
    .unwrap();

    let mut coordinator = Coordinator::new(config, "test-hash").unwrap();
    let seeds = vec![
        Seed::new("sao-paulo", "eletronicos"),
        Seed::new("manaus", "eletronicos"),
    ];
    let stats = coordinator
        .run(HttpRenderer::new("meli-leads/test").unwrap(), &seeds)
        .await
        .unwrap();

    assert_eq!(stats.seeds, 2);
    assert_eq!(stats.seeds_aborted, 1);
    assert_eq!(stats.inserted, 2);

    let store = SqliteStorage::new(&db_path, "BR").unwrap();
    assert_eq!(store.count_leads().unwrap(), 2);
    let vendors = store.existing_vendor_names().unwrap();
    assert!(vendors.contains("Acme"));
    assert!(vendors.contains("Betas"));

    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.leads_inserted, 2);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_second_run_skips_known_vendors() {
    let server = MockServer::start().await;
    mount_marketplace(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("leads.db");
    let seeds_path = dir.path().join("categories.csv");
    std::fs::write(&seeds_path, "city,category\nsao-paulo,eletronicos\n").unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        test_config(
            &format!("{}/", server.uri()),
            db_path.to_str().unwrap(),
            seeds_path.to_str().unwrap(),
        ),
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let first = run_crawl(config.clone(), &hash).await.unwrap();
    assert_eq!(first.inserted, 2);

    let second = run_crawl(config, &hash).await.unwrap();
    assert_eq!(second.records_emitted, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped_known, 2);

    let store = SqliteStorage::new(Path::new(&db_path), "BR").unwrap();
    assert_eq!(store.count_leads().unwrap(), 2);
    assert_eq!(
        store.count_leads_by_category().unwrap(),
        vec![("eletronicos".to_string(), 2)]
    );
}
