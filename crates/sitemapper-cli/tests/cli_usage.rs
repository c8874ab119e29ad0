#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::sitemapper_cmd;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    sitemapper_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("serve")
                .and(predicate::str::contains("extract"))
                .and(predicate::str::contains("archive")),
        );
}

#[test]
fn version_flag_prints_version() {
    sitemapper_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    sitemapper_cmd().assert().failure().code(2);
}

#[test]
fn serve_rejects_unparseable_bind_address() {
    sitemapper_cmd()
        .args(["serve", "--bind", "not-an-address"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("failed to bind"));
}

#[test]
fn invalid_explicit_config_is_reported() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[limits\nmax_depth = ")?;

    sitemapper_cmd()
        .args(["--config", config.to_str().unwrap(), "archive", "-o", "x.zip"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("failed to load config"));
    Ok(())
}
