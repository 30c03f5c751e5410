//! Deal history endpoints

mod common;

use axum::http::StatusCode;
use common::{request, signup, test_app};
use serde_json::json;

#[tokio::test]
async fn test_deal_round_trip_preserves_payloads() {
    let app = test_app().await;
    let (token, _) = signup(&app.router, "a@x.com").await;

    let input = json!({"price": 185000, "rent": 890.5, "city": "Nantes", "rooms": [2, 3]});
    let metrics = json!({"gross_yield": 5.77, "cashflow": -42.18, "score": {"value": 71}});

    let (status, created) = request(
        &app.router,
        "POST",
        "/api/deals",
        Some(&token),
        Some(json!({"title": "T3 centre", "input": input, "metrics": metrics})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["deal"]["input"], input);
    assert_eq!(created["deal"]["metrics"], metrics);
    assert_eq!(created["deal"]["tags"], json!([]));
    assert_eq!(created["deal"]["note"], "");

    let (status, listed) = request(&app.router, "GET", "/api/deals", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["deals"][0]["input"], input);
    assert_eq!(listed["deals"][0]["metrics"], metrics);
}

#[tokio::test]
async fn test_deals_do_not_require_subscription() {
    let app = test_app().await;
    let (token, _) = signup(&app.router, "free@x.com").await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/deals",
        Some(&token),
        Some(json!({"input": {"price": 1}, "metrics": {"score": 1}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deal_requires_input_and_metrics() {
    let app = test_app().await;
    let (token, _) = signup(&app.router, "a@x.com").await;

    for body in [
        json!({}),
        json!({"input": {"price": 1}}),
        json!({"metrics": {"score": 1}}),
    ] {
        let (status, response) =
            request(&app.router, "POST", "/api/deals", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "INVALID_ARGUMENT");
    }
}

#[tokio::test]
async fn test_patch_updates_only_tags_and_note() {
    let app = test_app().await;
    let (token, _) = signup(&app.router, "a@x.com").await;

    let (_, created) = request(
        &app.router,
        "POST",
        "/api/deals",
        Some(&token),
        Some(json!({"title": "Studio", "input": {"price": 90000}, "metrics": {"score": 55},
                    "tags": ["watch"], "note": "initial"})),
    )
    .await;
    let deal_id = created["deal"]["id"].as_u64().unwrap();

    let (status, updated) = request(
        &app.router,
        "PATCH",
        &format!("/api/deals/{deal_id}"),
        Some(&token),
        Some(json!({"tags": ["visited"], "note": "offer made"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["deal"]["tags"], json!(["visited"]));
    assert_eq!(updated["deal"]["note"], "offer made");
    assert_eq!(updated["deal"]["title"], "Studio");

    // partial patch leaves the other field alone
    let (_, updated) = request(
        &app.router,
        "PATCH",
        &format!("/api/deals/{deal_id}"),
        Some(&token),
        Some(json!({"note": "countered"})),
    )
    .await;
    assert_eq!(updated["deal"]["tags"], json!(["visited"]));
    assert_eq!(updated["deal"]["note"], "countered");
}

#[tokio::test]
async fn test_patch_foreign_deal_is_404() {
    let app = test_app().await;
    let (token_a, _) = signup(&app.router, "a@x.com").await;
    let (token_b, _) = signup(&app.router, "b@x.com").await;

    let (_, created) = request(
        &app.router,
        "POST",
        "/api/deals",
        Some(&token_a),
        Some(json!({"input": {}, "metrics": {}})),
    )
    .await;
    let deal_id = created["deal"]["id"].as_u64().unwrap();

    let (status, _) = request(
        &app.router,
        "PATCH",
        &format!("/api/deals/{deal_id}"),
        Some(&token_b),
        Some(json!({"note": "stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deals_listed_per_account() {
    let app = test_app().await;
    let (token_a, _) = signup(&app.router, "a@x.com").await;
    let (token_b, _) = signup(&app.router, "b@x.com").await;

    for _ in 0..2 {
        request(
            &app.router,
            "POST",
            "/api/deals",
            Some(&token_a),
            Some(json!({"input": {}, "metrics": {}})),
        )
        .await;
    }

    let (_, body_a) = request(&app.router, "GET", "/api/deals", Some(&token_a), None).await;
    let (_, body_b) = request(&app.router, "GET", "/api/deals", Some(&token_b), None).await;
    assert_eq!(body_a["deals"].as_array().unwrap().len(), 2);
    assert!(body_b["deals"].as_array().unwrap().is_empty());
}
