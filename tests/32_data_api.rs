mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{read, record_id, TestServer};

#[tokio::test]
async fn record_lifecycle() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();
    let user = Uuid::new_v4();
    let token = server.token(user)?;

    // Create
    let (status, body) = read(
        client
            .post(server.url("/api/data/tasks"))
            .bearer_auth(&token)
            .json(&json!({"title": "Prepare proposal", "priority": "high", "tags": ["sales"]}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_id"], user.to_string());
    assert_eq!(body["data"]["status"], "todo", "default applied");
    let id = record_id(&body);
    assert!(Uuid::parse_str(&id).is_ok());

    // Fetch
    let (status, body) = read(
        client
            .get(server.url(&format!("/api/data/tasks/{id}")))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Prepare proposal");

    // Patch touches only the supplied field
    let (status, body) = read(
        client
            .patch(server.url(&format!("/api/data/tasks/{id}")))
            .bearer_auth(&token)
            .json(&json!({"status": "in_progress"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["priority"], "high");

    // Put resets omitted fields to defaults or null
    let (status, body) = read(
        client
            .put(server.url(&format!("/api/data/tasks/{id}")))
            .bearer_auth(&token)
            .json(&json!({"title": "Proposal v2"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["title"], "Proposal v2");
    assert_eq!(body["data"]["priority"], "medium");
    assert_eq!(body["data"]["tags"], json!([]));
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["id"], id);

    // Delete
    let (status, body) = read(
        client
            .delete(server.url(&format!("/api/data/tasks/{id}")))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"id": id, "deleted": true}));

    let (status, body) = read(
        client
            .get(server.url(&format!("/api/data/tasks/{id}")))
            .bearer_auth(&token)
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn records_are_invisible_to_other_owners() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();
    let alice = server.token(Uuid::new_v4())?;
    let bob = server.token(Uuid::new_v4())?;

    let (_, body) = read(
        client
            .post(server.url("/api/data/deals"))
            .bearer_auth(&alice)
            .json(&json!({"name": "Northwind renewal", "value": 1200}))
            .send()
            .await?,
    )
    .await?;
    let id = record_id(&body);
    let path = format!("/api/data/deals/{id}");

    let (status, _) = read(client.get(server.url(&path)).bearer_auth(&bob).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = read(
        client
            .patch(server.url(&path))
            .bearer_auth(&bob)
            .json(&json!({"status": "lost"}))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = read(client.delete(server.url(&path)).bearer_auth(&bob).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = read(client.get(server.url("/api/data/deals")).bearer_auth(&bob).send().await?).await?;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    // Demo tenant is a separate owner as well
    let (_, body) = read(client.get(server.url("/api/data/deals?demo=true")).send().await?).await?;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    let (_, body) = read(client.get(server.url(&path)).bearer_auth(&alice).send().await?).await?;
    assert_eq!(body["data"]["status"], "open");
    Ok(())
}

#[tokio::test]
async fn team_members_use_their_own_owner_column() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();
    let user = Uuid::new_v4();

    let (status, body) = read(
        client
            .post(server.url("/api/data/team"))
            .bearer_auth(server.token(user)?)
            .json(&json!({"name": "Jordan", "email": "jordan@example.com"}))
            .send()
            .await?,
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["owner_id"], user.to_string());
    assert!(body["data"].get("user_id").is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_ids_and_unknown_resources() -> Result<()> {
    let server = TestServer::start().await?;
    let client = reqwest::Client::new();

    let (status, body) = read(client.get(server.url("/api/data/tasks/42?demo=true")).send().await?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = read(client.get(server.url("/api/data/invoices?demo=true")).send().await?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Unknown resource 'invoices'");

    let missing = Uuid::new_v4();
    let (status, _) = read(
        client
            .delete(server.url(&format!("/api/data/meetings/{missing}?demo=true")))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn demo_requests_read_seeded_fixtures() -> Result<()> {
    let server = TestServer::start_seeded().await?;
    let client = reqwest::Client::new();

    let (status, body) = read(client.get(server.url("/api/data/tasks?demo=true")).send().await?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 4);

    // A real session never sees the demo tenant
    let token = server.token(Uuid::new_v4())?;
    let (_, body) = read(client.get(server.url("/api/data/tasks")).bearer_auth(token).send().await?).await?;
    assert_eq!(body["data"]["pagination"]["total"], 0);
    Ok(())
}
