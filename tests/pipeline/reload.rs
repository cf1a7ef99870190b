use std::fs;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unax::config::Config;
use unax::lifecycle::{LifecycleCommand, LifecycleSignal, LifecycleState};
use unax::links::{DomainRegistry, LinkConfig};

use crate::bot_harness::{channel_message, host, link_bot};

fn write_lists(dir: &TempDir, general: &str) {
    fs::write(dir.path().join("domains-bsky.txt"), "bsky.app\n").unwrap();
    fs::write(dir.path().join("domains-twitter.txt"), "x.com\ntwitter.com\n").unwrap();
    fs::write(dir.path().join("domains-links.txt"), general).unwrap();
}

fn config_in(dir: &TempDir) -> Config {
    Config {
        config_path: dir.path().join("unax.toml"),
        ..Config::default()
    }
}

#[tokio::test]
async fn refresh_picks_up_new_domains_on_next_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<title>Fresh news</title>"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_lists(&dir, "lwn.net\n");
    let registry = DomainRegistry::new(config_in(&dir).domain_sources());
    let (mut bot, transport) = link_bot(registry, LinkConfig::default());

    let text = format!("{}/news", server.uri());
    bot.handle_message(&channel_message("alice", &text)).await;
    assert!(transport.sent.lock().await.is_empty());

    write_lists(&dir, &format!("lwn.net\n# added later\n{}\n", host(&server)));
    assert_eq!(
        bot.apply_signal(LifecycleSignal::UserDefined1),
        Some(LifecycleCommand::Reload)
    );
    assert_eq!(bot.state(), LifecycleState::ReloadPending);

    bot.handle_message(&channel_message("alice", &text)).await;
    assert_eq!(transport.lines().await, vec!["Title: Fresh news"]);
    assert_eq!(bot.state(), LifecycleState::Running);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_domains() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Still here</title>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_lists(&dir, &format!("{}\n", host(&server)));
    let registry = DomainRegistry::new(config_in(&dir).domain_sources());
    let (mut bot, transport) = link_bot(registry, LinkConfig::default());

    fs::remove_file(dir.path().join("domains-links.txt")).unwrap();
    bot.apply_signal(LifecycleSignal::UserDefined1);

    let text = format!("{}/page", server.uri());
    bot.handle_message(&channel_message("alice", &text)).await;

    assert_eq!(transport.lines().await, vec!["Title: Still here"]);
    assert_eq!(bot.state(), LifecycleState::ReloadPending);
}
