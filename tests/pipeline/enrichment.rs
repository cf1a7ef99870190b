use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unax::links::{DomainRegistry, LinkConfig};

use crate::bot_harness::{CHANNEL, channel_message, host, link_bot};

fn page(title: &str) -> String {
    format!("<html><head><title>{title}</title></head><body></body></html>")
}

#[tokio::test]
async fn social_post_replies_with_first_description_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/alice/post/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><meta property="og:description" content="Funny cat video
more text"></head></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let registry =
        DomainRegistry::from_static(vec![host(&server)], vec!["x.com".into()], vec!["lwn.net".into()])
            .unwrap();
    let (mut bot, transport) = link_bot(registry, LinkConfig::default());

    let text = format!("look {}/profile/alice/post/1", server.uri());
    bot.handle_message(&channel_message("alice", &text)).await;

    assert_eq!(
        *transport.sent.lock().await,
        vec![(CHANNEL.to_string(), "Funny cat video".to_string())]
    );
    server.verify().await;
}

#[tokio::test]
async fn short_post_replies_with_mirror_and_its_title() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thread/999"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Thread by @bob")))
        .mount(&mirror)
        .await;

    let registry = DomainRegistry::from_static(
        vec!["bsky.app".into()],
        vec![host(&origin)],
        vec!["lwn.net".into()],
    )
    .unwrap();
    let (mut bot, transport) = link_bot(
        registry,
        LinkConfig {
            mirror_base_url: mirror.uri(),
            ..LinkConfig::default()
        },
    );

    let text = format!("{}/bob/status/999", origin.uri());
    bot.handle_message(&channel_message("alice", &text)).await;

    assert_eq!(
        transport.lines().await,
        vec![
            format!("See also: {}/thread/999", mirror.uri()),
            "Title: Thread by @bob".to_string(),
        ]
    );
    assert!(origin.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn short_post_mirror_without_title_replies_with_link_only() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/thread/999"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>unrolled</body></html>"))
        .mount(&mirror)
        .await;

    let registry = DomainRegistry::from_static(
        vec!["bsky.app".into()],
        vec![host(&origin)],
        vec!["lwn.net".into()],
    )
    .unwrap();
    let (mut bot, transport) = link_bot(
        registry,
        LinkConfig {
            mirror_base_url: mirror.uri(),
            ..LinkConfig::default()
        },
    );

    let text = format!("{}/bob/status/999", origin.uri());
    bot.handle_message(&channel_message("alice", &text)).await;

    assert_eq!(
        transport.lines().await,
        vec![format!("See also: {}/thread/999", mirror.uri())]
    );
}

#[tokio::test]
async fn failed_fetch_does_not_suppress_other_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Working page")))
        .mount(&server)
        .await;

    let registry =
        DomainRegistry::from_static(vec!["bsky.app".into()], vec!["x.com".into()], vec![host(&server)])
            .unwrap();
    let (mut bot, transport) = link_bot(registry, LinkConfig::default());

    let text = format!("{0}/broken and {0}/works", server.uri());
    bot.handle_message(&channel_message("alice", &text)).await;

    assert_eq!(transport.lines().await, vec!["Title: Working page"]);
}

#[tokio::test]
async fn replies_follow_category_order() {
    let social = MockServer::start().await;
    let general = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<meta property="og:description" content="A post">"#,
        ))
        .mount(&social)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("An article")))
        .mount(&general)
        .await;

    let registry =
        DomainRegistry::from_static(vec![host(&social)], vec!["x.com".into()], vec![host(&general)])
            .unwrap();
    let (mut bot, transport) = link_bot(registry, LinkConfig::default());

    let text = format!("{}/article then {}/post/1", general.uri(), social.uri());
    bot.handle_message(&channel_message("alice", &text)).await;

    assert_eq!(transport.lines().await, vec!["A post", "Title: An article"]);
}

#[tokio::test]
async fn message_without_links_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Never")))
        .expect(0)
        .mount(&server)
        .await;

    let registry =
        DomainRegistry::from_static(vec!["bsky.app".into()], vec!["x.com".into()], vec![host(&server)])
            .unwrap();
    let (mut bot, transport) = link_bot(registry, LinkConfig::default());

    bot.handle_message(&channel_message("alice", "good morning everyone"))
        .await;

    assert!(transport.sent.lock().await.is_empty());
    server.verify().await;
}
