#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

const OVERRIDE_VARS: [&str; 5] = [
    "SITEMAPPER_FETCH_TIMEOUT_SECS",
    "SITEMAPPER_CONCURRENCY",
    "SITEMAPPER_MAX_DEPTH",
    "SITEMAPPER_MAX_SITEMAPS",
    "SITEMAPPER_BIND",
];

fn config_dir() -> &'static Path {
    static CONFIG_DIR: OnceLock<TempDir> = OnceLock::new();
    CONFIG_DIR
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"))
        .path()
}

/// Create a `sitemapper` command isolated from the user's config and environment.
#[allow(dead_code)]
pub fn sitemapper_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitemapper"));
    cmd.timeout(CMD_TIMEOUT);
    // Points at a file that never exists, so defaults apply.
    cmd.env("SITEMAPPER_CONFIG", config_dir().join("config.toml"));
    for var in OVERRIDE_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[allow(dead_code)]
pub fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|u| format!("<url><loc>{u}</loc></url>"))
        .collect();
    format!(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#)
}

#[allow(dead_code)]
pub fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|u| format!("<sitemap><loc>{u}</loc></sitemap>"))
        .collect();
    format!(
        r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#
    )
}

#[allow(dead_code)]
pub async fn mount(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn read_zip_entry(bytes: Vec<u8>, name: &str) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}
