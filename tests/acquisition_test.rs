use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pricelist_fetch::error::AcquireResult;
use pricelist_fetch::infrastructure::HttpClient;
use pricelist_fetch::models::parse_registry;
use pricelist_fetch::services::StaticLinkRetriever;
use pricelist_fetch::{
    AcquireError, AcquisitionOrchestrator, Config, ErrorKind, RetrievalStrategy, StrategyKind,
    VendorEntry,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 浏览器不可用时的交互式获取
struct NoBrowser {
    attempts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RetrievalStrategy for NoBrowser {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Interactive
    }

    async fn acquire(&self, entry: &VendorEntry) -> AcquireResult<PathBuf> {
        self.attempts.lock().unwrap().push(entry.vendor_id.clone());
        Err(AcquireError::startup("chrome not installed"))
    }
}

async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

fn registry_toml(base: &str) -> String {
    format!(
        r#"
[[vendor]]
id = "alpha"
url = "{base}/alpha"
strategy = "static_link"
link_match_token = "?eflws_download=001"
base_url = "{base}"

[[vendor]]
id = "tradepac"
url = "{base}/tradepac"
strategy = "interactive"
file_locator = "//a[contains(@href, '/PRICELIST')]"
download_trigger_locator = "//span[text()='Download']"

[[vendor]]
id = "beta"
url = "{base}/beta"
strategy = "static_link"
link_match_token = "Price list folder"
base_url = "{base}"

[[vendor]]
id = "gamma"
url = "{base}/gamma"
strategy = "static_link"
link_match_token = "uploads/misc"
base_url = "{base}"

[[vendor]]
id = "pc_themes"
url = "{base}/pcthemes"
strategy = "interactive"
file_locator = "//a[contains(@href, '/PRICELIST')]"
download_trigger_locator = "//span[text()='Download']"

[[vendor]]
id = "retired"
url = "{base}/retired"
strategy = "static_link"
link_match_token = "x"
enabled = false
"#
    )
}

#[tokio::test]
async fn run_records_one_outcome_per_vendor_and_isolates_failures() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/alpha",
        r#"<a href="/files/other.pdf">old</a><a href="/files/001.pdf?eflws_download=001">new</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/001.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-alpha".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/beta", r#"<a href="/contact">contact</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/gamma"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let config = Config::with_output_dir(output.path());
    let registry = parse_registry(&registry_toml(&server.uri()), "test").unwrap();
    assert_eq!(registry.len(), 5);

    let attempts = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = AcquisitionOrchestrator::new(registry, false)
        .with_strategy(Arc::new(StaticLinkRetriever::new(
            &config,
            HttpClient::new(&config).unwrap(),
        )))
        .with_strategy(Arc::new(NoBrowser {
            attempts: Arc::clone(&attempts),
        }));

    let summary = orchestrator.run().await;

    let outcomes: Vec<_> = summary
        .results
        .iter()
        .map(|r| (r.vendor_id.as_str(), r.error_kind))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("alpha", None),
            ("tradepac", Some(ErrorKind::StartupFailure)),
            ("beta", Some(ErrorKind::NotFound)),
            ("gamma", Some(ErrorKind::TransportFailure)),
            ("pc_themes", Some(ErrorKind::StartupFailure)),
        ]
    );
    // 启动失败后不再尝试第二个交互式供应商
    assert_eq!(*attempts.lock().unwrap(), vec!["tradepac"]);
    assert!(summary.had_startup_failure());

    let saved = output.path().join("alpha.pdf");
    assert_eq!(summary.results[0].file_path.as_deref(), Some(saved.as_path()));
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-alpha");

    // 只剩下规范文件，没有临时目录
    let names: Vec<_> = std::fs::read_dir(output.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["alpha.pdf"]);
}

#[tokio::test]
async fn second_run_replaces_the_canonical_file() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/alpha",
        r#"<a href="/files/001.pdf?eflws_download=001">new</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/001.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-v2".to_vec()))
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    std::fs::write(output.path().join("alpha.pdf"), b"%PDF-v1").unwrap();

    let config = Config::with_output_dir(output.path());
    let entry = VendorEntry::static_link(
        "alpha",
        format!("{}/alpha", server.uri()),
        "?eflws_download=001",
        server.uri(),
    );
    let retriever = StaticLinkRetriever::new(&config, HttpClient::new(&config).unwrap());

    let first = retriever.acquire(&entry).await;
    let second = retriever.acquire(&entry).await;

    tokio_test::assert_ok!(first);
    let path = tokio_test::assert_ok!(second);
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-v2");
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 1);
}

#[tokio::test]
#[ignore] // 需要本机安装 Chrome 并能访问外网：cargo test -- --ignored
async fn test_builtin_registry_against_live_sites() {
    let output = tempfile::tempdir().unwrap();
    let mut config = Config::from_env();
    config.output_dir = output.path().to_path_buf();

    let app = pricelist_fetch::App::initialize(config, &[])
        .await
        .expect("初始化失败");
    let summary = app.run().await.expect("运行失败");

    assert_eq!(summary.total(), summary.results.len());
    assert!(summary.succeeded().count() > 0, "至少应当下载到一个文档");
}
