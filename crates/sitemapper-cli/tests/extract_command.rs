#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{mount, read_zip_entry, sitemap_index, sitemapper_cmd, urlset};
use predicates::prelude::*;
use serde_json::Value;
use wiremock::MockServer;

#[tokio::test]
async fn extract_prints_urls_one_per_line() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let base = server.uri();
    mount(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{base}/pages.xml"), format!("{base}/posts.xml")]),
    )
    .await;
    mount(
        &server,
        "/pages.xml",
        200,
        urlset(&["https://example.com/", "https://example.com/about"]),
    )
    .await;
    mount(
        &server,
        "/posts.xml",
        200,
        urlset(&["https://example.com/about", "https://example.com/blog/1"]),
    )
    .await;

    sitemapper_cmd()
        .args(["extract", &format!("{base}/sitemap.xml")])
        .assert()
        .success()
        .stdout("https://example.com/\nhttps://example.com/about\nhttps://example.com/blog/1\n")
        .stderr(predicate::str::contains("3 URLs from 3 sitemaps"));

    Ok(())
}

#[tokio::test]
async fn extract_json_reports_skipped_branches() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let base = server.uri();
    mount(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{base}/ok.xml"), format!("{base}/gone.xml")]),
    )
    .await;
    mount(&server, "/ok.xml", 200, urlset(&["https://example.com/u1"])).await;
    mount(&server, "/gone.xml", 404, String::new()).await;

    let output = sitemapper_cmd()
        .args(["extract", &format!("{base}/sitemap.xml"), "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: Value = serde_json::from_slice(&output)?;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["urls"][0], "https://example.com/u1");
    assert_eq!(payload["sitemapsVisited"], 3);
    assert_eq!(payload["skipped"][0]["category"], "branch_fetch_failed");
    Ok(())
}

#[tokio::test]
async fn extract_writes_archive_when_requested() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(
        &server,
        "/sitemap.xml",
        200,
        urlset(&["https://example.com/a", "https://example.com/b"]),
    )
    .await;
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("urls.zip");

    sitemapper_cmd()
        .args([
            "extract",
            &format!("{}/sitemap.xml", server.uri()),
            "--archive",
            archive.to_str().unwrap(),
        ])
        .assert()
        .success();

    let text = read_zip_entry(std::fs::read(&archive)?, "sitemap_urls.txt");
    assert_eq!(text, "https://example.com/a\nhttps://example.com/b");
    Ok(())
}

#[tokio::test]
async fn extract_depth_flag_limits_walk() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let base = server.uri();
    mount(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{base}/nested.xml"), format!("{base}/top.xml")]),
    )
    .await;
    mount(&server, "/nested.xml", 200, sitemap_index(&[format!("{base}/deep.xml")])).await;
    mount(&server, "/top.xml", 200, urlset(&["https://example.com/top"])).await;
    mount(&server, "/deep.xml", 200, urlset(&["https://example.com/deep"])).await;

    sitemapper_cmd()
        .args(["extract", &format!("{base}/sitemap.xml"), "--max-depth", "1"])
        .assert()
        .success()
        .stdout("https://example.com/top\n");
    Ok(())
}

#[test]
fn extract_rejects_invalid_url() {
    sitemapper_cmd()
        .args(["extract", "not a url"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid input"));
}

#[tokio::test]
async fn extract_unreachable_root_exits_with_network_code() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "/sitemap.xml", 500, String::new()).await;

    sitemapper_cmd()
        .args(["extract", &format!("{}/sitemap.xml", server.uri())])
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("Failed to fetch sitemap"));
    Ok(())
}

#[tokio::test]
async fn extract_empty_sitemap_exits_with_not_found_code() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "/sitemap.xml", 200, urlset(&[])).await;

    sitemapper_cmd()
        .args(["extract", &format!("{}/sitemap.xml", server.uri())])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No URLs found"));
    Ok(())
}

#[test]
fn extract_rejects_zero_timeout() {
    sitemapper_cmd()
        .args(["extract", "https://example.com/sitemap.xml", "--timeout", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("timeout_secs"));
}
