use std::net::SocketAddr;

use forumhub_render::{CliArgs, Mode, ProgressMode};
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use url::Url;

fn args(store: &MockServer, user_id: Option<&str>, write_joins: bool) -> CliArgs {
    CliArgs {
        store_url: Some(Url::parse(&store.base_url()).unwrap()),
        store_key: Some("anon-key".to_string()),
        user_id: user_id.map(str::to_string),
        mode: Mode::Serve,
        out: None,
        listen: "127.0.0.1:0".to_string(),
        write_joins,
        user_agent: "test-agent".to_string(),
        progress: ProgressMode::Never,
    }
}

async fn spawn(args: &CliArgs) -> SocketAddr {
    let app = forumhub_render::router(args).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn mock_free_community(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/communities")
            .query_param("id", "eq.1");
        then.status(200).json_body(json!([
            { "id": "1", "name": "Gardening", "description": "Soil and seeds",
              "member_count": 12, "topic_count": 0, "activity_level": "low", "type": "free" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/topics")
            .query_param("community_id", "eq.1");
        then.status(200).json_body(json!([]));
    });
}

#[tokio::test(flavor = "multi_thread")]
async fn community_page_and_missing_community() {
    let server = MockServer::start();
    mock_free_community(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/communities")
            .query_param("id", "eq.404");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/topics")
            .query_param("community_id", "eq.404");
        then.status(200).json_body(json!([]));
    });

    let addr = spawn(&args(&server, None, false)).await;
    let http = client();

    let resp = http.get(format!("http://{addr}/community/1")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Gardening"));
    assert!(body.contains("Topics (0)"));
    assert!(body.contains("No topics yet"));
    assert!(body.contains(r#"action="/community/1/join""#));

    let resp = http.get(format!("http://{addr}/community/404")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp.text().await.unwrap().contains("Community not found"));

    let resp = http.get(format!("http://{addr}/no/such/page")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test(flavor = "multi_thread")]
async fn join_redirects_and_records_membership() {
    let server = MockServer::start();
    mock_free_community(&server);
    let insert = server.mock(|when, then| {
        when.method(POST)
            .path("/rest/v1/community_memberships")
            .header("prefer", "return=representation")
            .json_body(json!([{ "user_id": "u1", "community_id": "1" }]));
        then.status(201).json_body(json!([{ "user_id": "u1", "community_id": "1" }]));
    });

    let addr = spawn(&args(&server, Some("u1"), true)).await;
    let http = client();

    let resp = http
        .post(format!("http://{addr}/community/1/join"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/community/1");
    insert.assert();

    let body = http
        .get(format!("http://{addr}/community/1"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Joined"));
    assert!(!body.contains(r#"action="/community/1/join""#));
}

#[tokio::test(flavor = "multi_thread")]
async fn join_stays_local_without_write_joins() {
    let server = MockServer::start();
    mock_free_community(&server);
    let insert = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/community_memberships");
        then.status(201).json_body(json!([]));
    });

    let addr = spawn(&args(&server, Some("u1"), false)).await;
    let resp = client()
        .post(format!("http://{addr}/community/1/join"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(insert.hits(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn serves_stylesheet() {
    let server = MockServer::start();
    let addr = spawn(&args(&server, None, false)).await;

    let resp = client()
        .get(format!("http://{addr}/assets/site.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/css; charset=utf-8");
    assert!(resp.text().await.unwrap().contains(".fh-tab-toggle"));
}

#[tokio::test(flavor = "multi_thread")]
async fn ids_with_spaces_round_trip_through_links() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/communities")
            .query_param("id", "eq.open source");
        then.status(200).json_body(json!([
            { "id": "open source", "name": "Open Source", "member_count": 3, "type": "free" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/topics")
            .query_param("community_id", "eq.open source");
        then.status(200).json_body(json!([]));
    });

    let addr = spawn(&args(&server, None, false)).await;
    let http = client();

    let resp = http
        .get(format!("http://{addr}/community/open%20source"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Open Source"));
    assert!(body.contains(r#"action="/community/open%20source/join""#));

    let resp = http
        .post(format!("http://{addr}/community/open%20source/join"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/community/open%20source");
}

#[tokio::test(flavor = "multi_thread")]
async fn join_rejects_unknown_and_paid_communities() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/communities")
            .query_param("id", "eq.missing");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/communities")
            .query_param("id", "eq.2");
        then.status(200).json_body(json!([
            { "id": "2", "name": "Design Guild", "type": "paid", "price": 9.99 }
        ]));
    });
    let insert = server.mock(|when, then| {
        when.method(POST).path("/rest/v1/community_memberships");
        then.status(201).json_body(json!([]));
    });

    let addr = spawn(&args(&server, Some("u1"), true)).await;
    let http = client();

    let resp = http
        .post(format!("http://{addr}/community/missing/join"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert!(resp.text().await.unwrap().contains("Community not found"));

    let resp = http
        .post(format!("http://{addr}/community/2/join"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert!(resp.text().await.unwrap().contains("$9.99/mo"));

    assert_eq!(insert.hits(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_home_offers_retry() {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.path_contains("/rest/v1/");
        then.status(500).body("boom");
    });

    let addr = spawn(&args(&server, None, false)).await;
    let http = client();

    let body = http
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Failed to load topics. Please try again later."));
    assert!(body.contains(r#"href="/?retry=true""#));

    let resp = http.get(format!("http://{addr}/?retry=true")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().contains("Welcome to our new forum platform!"));
    assert_eq!(failing.hits(), 4);
}
