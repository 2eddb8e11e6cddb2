//! End-to-end tests against a running gateway.

use sha2::{Digest, Sha256};

mod common;

const USERS: &[(&str, &str)] = &[("foo", "some_user")];

fn rules_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    common::write_rules(
        dir.path(),
        &[("_default.yaml", "D"), ("sample.yml", "S"), ("extra.yaml", "E")],
    );
    dir
}

#[tokio::test]
async fn test_health_check_needs_no_credentials() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;

    let res = common::client().get(gw.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_token_header() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;
    let client = common::client();

    let res = client
        .get(gw.url("/ruleset?rulesets=sample"))
        .header("X-Auth-Token", "foo")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "D\n\nS\n");

    let res = client
        .get(gw.url("/ruleset?rulesets=sample"))
        .header("X-Auth-Token", "bar")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
    assert_eq!(res.text().await.unwrap(), "Forbidden\n");
}

#[tokio::test]
async fn test_basic_auth_ignores_identity() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;
    let client = common::client();

    for user in ["some_user", "somebody_else"] {
        let res = client
            .get(gw.url("/ruleset?rulesets=extra"))
            .basic_auth(user, Some("foo"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "user {user}");
        assert_eq!(res.text().await.unwrap(), "D\n\nE\n");
    }

    let res = client
        .get(gw.url("/ruleset?rulesets=extra"))
        .basic_auth("some_user", Some("foo2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn test_composition_properties() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;
    let client = common::client();

    let fetch = |rulesets: &'static str| {
        let req = client
            .get(gw.url("/ruleset"))
            .query(&[("rulesets", rulesets)])
            .header("X-Auth-Token", "foo");
        async move { req.send().await.unwrap().text().await.unwrap() }
    };

    assert_eq!(fetch("default").await, "D");
    assert_eq!(fetch("DEFAULT").await, "D");
    assert_eq!(fetch("unknown-name").await, "D");
    assert_eq!(fetch("sample,sample").await, "D\n\nS\n\n\nS\n");
    assert_eq!(fetch("Extra,nope,sample").await, "D\n\nE\n\n\nS\n");
    assert_eq!(fetch("sample,extra").await, fetch("sample,extra").await);
}

#[tokio::test]
async fn test_missing_rulesets_is_bad_request() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;

    for path in ["/ruleset", "/ruleset?rulesets=", "/sum"] {
        let res = common::client()
            .get(gw.url(path))
            .header("X-Auth-Token", "foo")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "path {path}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "rulesets parameter is required");
    }
}

#[tokio::test]
async fn test_sum_is_sha256_of_ruleset() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;
    let client = common::client();

    let rules = client
        .get(gw.url("/ruleset?rulesets=sample,extra"))
        .header("X-Auth-Token", "foo")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let sum = client
        .get(gw.url("/sum?rulesets=sample,extra"))
        .header("X-Auth-Token", "foo")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(sum, format!("{:x}", Sha256::digest(rules.as_bytes())));
}

#[tokio::test]
async fn test_concurrent_requests_agree() {
    let dir = rules_dir();
    let gw = common::start_gateway(dir.path(), USERS).await;
    let client = common::client();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let req = client
            .get(gw.url("/ruleset?rulesets=extra,sample"))
            .header("X-Auth-Token", "foo");
        handles.push(tokio::spawn(async move {
            req.send().await.unwrap().text().await.unwrap()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), "D\n\nE\n\n\nS\n");
    }
}
