mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{read, TestServer};

async fn seed_tasks(server: &TestServer, token: &str) -> Result<()> {
    let client = reqwest::Client::new();
    for (title, status, priority) in [
        ("Draft invoice", "todo", "high"),
        ("Call supplier", "blocked", "low"),
        ("Send invoice", "todo", "urgent"),
        ("Archive files", "completed", "medium"),
        ("Plan 50% discount", "review", "low"),
    ] {
        let res = client
            .post(server.url("/api/data/tasks"))
            .bearer_auth(token)
            .json(&json!({"title": title, "status": status, "priority": priority}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    Ok(())
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn filters_search_and_sort() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();
    let token = server.token(Uuid::new_v4())?;
    seed_tasks(&server, &token).await?;

    let (status, body) = read(
        client
            .get(server.url("/api/data/tasks?status=todo&search=INVOICE&sort_by=title&sort_order=asc"))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(titles(&body), vec!["Draft invoice", "Send invoice"]);

    // Comma lists and repeated keys both mean "any of"
    let (_, body) = read(
        client
            .get(server.url("/api/data/tasks?status=todo,blocked&priority=low&priority=urgent&sortBy=title&sortOrder=asc"))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(titles(&body), vec!["Call supplier", "Send invoice"]);

    // status=all disables the filter; unknown keys are ignored
    let (_, body) = read(
        client
            .get(server.url("/api/data/tasks?status=all&colour=red"))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(body["data"]["pagination"]["total"], 5);

    // LIKE wildcards in search terms match literally
    let (_, body) = read(
        client
            .get(server.url("/api/data/tasks?search=50%25"))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(titles(&body), vec!["Plan 50% discount"]);
    Ok(())
}

#[tokio::test]
async fn pagination_metadata() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();
    let token = server.token(Uuid::new_v4())?;
    seed_tasks(&server, &token).await?;

    let (_, body) = read(
        client
            .get(server.url("/api/data/tasks?limit=2&page=3&sort_by=title&sort_order=asc"))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(
        body["data"]["pagination"],
        json!({"page": 3, "limit": 2, "total": 5, "total_pages": 3})
    );
    assert_eq!(titles(&body), vec!["Send invoice"]);

    // Oversized limits are clamped
    let (_, body) = read(
        client
            .get(server.url("/api/data/tasks?limit=1000"))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(body["data"]["pagination"]["limit"], server.config.api.max_page_size);
    Ok(())
}

#[tokio::test]
async fn invalid_query_parameters_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    for query in ["sort_by=description", "sort_by=user_id", "page=0", "limit=abc"] {
        let (status, body) = read(
            client
                .get(server.url(&format!("/api/data/tasks?demo=true&{query}")))
                .send()
                .await?,
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}: {body}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["field_errors"].is_object());
    }
    Ok(())
}
