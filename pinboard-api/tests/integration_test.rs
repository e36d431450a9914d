/// Integration tests for the Pinboard API
///
/// These tests verify the full system works end-to-end against a real
/// PostgreSQL database (DATABASE_URL):
/// - Registration and login
/// - Board creation with transactional owner membership
/// - Membership-gated access (403 for non-members, 404 for absent resources)
/// - Append-only positioning and absolute-index reordering
/// - Card moves and partial detail updates
/// - Comments with author attribution
/// - Real-time fan-out signals on mutations

mod common;

use axum::http::StatusCode;
use common::{body_json, json_request, TestContext};
use pinboard_shared::models::membership::BoardMember;
use serde_json::json;
use tower::Service as _;
use uuid::Uuid;

/// Creates a board through the API and returns its id
async fn create_board(ctx: &mut TestContext, name: &str) -> Uuid {
    let request = json_request(
        "POST",
        "/boards",
        Some(&ctx.auth_header()),
        Some(json!({ "name": name })),
    );

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    body["id"].as_str().unwrap().parse().unwrap()
}

/// Creates a list through the API and returns (id, position)
async fn create_list(ctx: &mut TestContext, board_id: Uuid, name: &str) -> (Uuid, i64) {
    let request = json_request(
        "POST",
        "/lists",
        Some(&ctx.auth_header()),
        Some(json!({ "board_id": board_id, "name": name })),
    );

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    (
        body["id"].as_str().unwrap().parse().unwrap(),
        body["position"].as_i64().unwrap(),
    )
}

/// Creates a card through the API and returns (id, position)
async fn create_card(ctx: &mut TestContext, list_id: Uuid, content: &str) -> (Uuid, i64) {
    let request = json_request(
        "POST",
        "/cards",
        Some(&ctx.auth_header()),
        Some(json!({ "list_id": list_id, "content": content })),
    );

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    (
        body["id"].as_str().unwrap().parse().unwrap(),
        body["position"].as_i64().unwrap(),
    )
}

/// Fetches the full board snapshot through the API
async fn get_board(ctx: &mut TestContext, board_id: Uuid) -> serde_json::Value {
    let request = json_request(
        "GET",
        &format!("/boards/{}", board_id),
        Some(&ctx.auth_header()),
        None,
    );

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    body_json(response).await
}

#[tokio::test]
async fn test_register_login_scenario() {
    let mut ctx = TestContext::new().await.unwrap();

    let email = format!("a-{}@x.com", Uuid::new_v4());

    // Register yields 201 with a token
    let request = json_request(
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "pw1" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body["token"].is_string());

    // Login with the right password yields 200 with a token
    let request = json_request(
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "pw1" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["token"].is_string());

    // Login with the wrong password yields 400
    let request = json_request(
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "wrong" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The registered account is a real user row
    let user = pinboard_shared::models::user::User::find_by_email(&ctx.db, &email)
        .await
        .unwrap()
        .unwrap();
    let by_id = pinboard_shared::models::user::User::find_by_id(&ctx.db, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.email, email);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let mut ctx = TestContext::new().await.unwrap();

    let request = json_request(
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": ctx.user.email, "password": "pw1" })),
    );

    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_authentication_required() {
    let mut ctx = TestContext::new().await.unwrap();

    // No Authorization header
    let request = json_request("GET", "/boards", None, None);
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let request = json_request("GET", "/boards", Some("Bearer not.a.token"), None);
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_board_creates_owner_membership() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;

    // Exactly one member: the owner
    let count = BoardMember::count_for_board(&ctx.db, board_id).await.unwrap();
    assert_eq!(count, 1);
    assert!(BoardMember::has_access(&ctx.db, board_id, ctx.user.id)
        .await
        .unwrap());

    // The board shows up in the creator's listing
    let request = json_request("GET", "/boards", Some(&ctx.auth_header()), None);
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&board_id.to_string().as_str()));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_list_creation_appends_positions() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;

    let (_, pos0) = create_list(&mut ctx, board_id, "Todo").await;
    let (_, pos1) = create_list(&mut ctx, board_id, "Doing").await;
    let (_, pos2) = create_list(&mut ctx, board_id, "Done").await;

    assert_eq!(pos0, 0);
    assert_eq!(pos1, 1);
    assert_eq!(pos2, 2);

    // Snapshot returns lists ordered by ascending position
    let board = get_board(&mut ctx, board_id).await;
    let names: Vec<&str> = board["lists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Todo", "Doing", "Done"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_reorder_lists_is_idempotent() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;
    let (todo_id, _) = create_list(&mut ctx, board_id, "Todo").await;
    let (done_id, _) = create_list(&mut ctx, board_id, "Done").await;

    let reorder = json!({ "boardId": board_id, "orderedListIds": [done_id, todo_id] });

    for _ in 0..2 {
        let request = json_request(
            "PUT",
            "/lists/reorder",
            Some(&ctx.auth_header()),
            Some(reorder.clone()),
        );
        let response = ctx.app.call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let board = get_board(&mut ctx, board_id).await;
        let lists = board["lists"].as_array().unwrap();
        assert_eq!(lists[0]["id"].as_str().unwrap(), done_id.to_string());
        assert_eq!(lists[0]["position"], 0);
        assert_eq!(lists[1]["id"].as_str().unwrap(), todo_id.to_string());
        assert_eq!(lists[1]["position"], 1);
    }

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_card_create_and_move() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;
    let (todo_id, _) = create_list(&mut ctx, board_id, "Todo").await;
    let (done_id, _) = create_list(&mut ctx, board_id, "Done").await;

    let (card_id, pos) = create_card(&mut ctx, todo_id, "task1").await;
    assert_eq!(pos, 0);

    // Move the card to Done at position 0
    let request = json_request(
        "PUT",
        "/cards/move",
        Some(&ctx.auth_header()),
        Some(json!({ "cardId": card_id, "newListId": done_id, "newPosition": 0 })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The snapshot shows task1 under Done
    let board = get_board(&mut ctx, board_id).await;
    let lists = board["lists"].as_array().unwrap();
    let todo = lists.iter().find(|l| l["name"] == "Todo").unwrap();
    let done = lists.iter().find(|l| l["name"] == "Done").unwrap();

    assert!(todo["cards"].as_array().unwrap().is_empty());
    let done_cards = done["cards"].as_array().unwrap();
    assert_eq!(done_cards.len(), 1);
    assert_eq!(done_cards[0]["id"].as_str().unwrap(), card_id.to_string());
    assert_eq!(done_cards[0]["list_id"].as_str().unwrap(), done_id.to_string());
    assert_eq!(done_cards[0]["position"], 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_non_member_access_is_forbidden() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Private").await;
    let (list_id, _) = create_list(&mut ctx, board_id, "Todo").await;
    let (card_id, _) = create_card(&mut ctx, list_id, "secret task").await;

    let (_, other_token) = ctx.second_user().await.unwrap();
    let other_auth = format!("Bearer {}", other_token);

    // Board snapshot
    let request = json_request("GET", &format!("/boards/{}", board_id), Some(&other_auth), None);
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // List creation on the board
    let request = json_request(
        "POST",
        "/lists",
        Some(&other_auth),
        Some(json!({ "board_id": board_id, "name": "Sneaky" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // List deletion
    let request = json_request("DELETE", &format!("/lists/{}", list_id), Some(&other_auth), None);
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Card creation, deletion, move, details, comments
    let request = json_request(
        "POST",
        "/cards",
        Some(&other_auth),
        Some(json!({ "list_id": list_id, "content": "sneaky" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = json_request("DELETE", &format!("/cards/{}", card_id), Some(&other_auth), None);
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = json_request(
        "PUT",
        "/cards/move",
        Some(&other_auth),
        Some(json!({ "cardId": card_id, "newListId": list_id, "newPosition": 0 })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = json_request(
        "GET",
        &format!("/cards/{}/details", card_id),
        Some(&other_auth),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = json_request(
        "POST",
        "/comments",
        Some(&other_auth),
        Some(json!({ "card_id": card_id, "text": "hi" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A board that doesn't exist at all is 404, not 403
    let request = json_request(
        "GET",
        &format!("/boards/{}", Uuid::new_v4()),
        Some(&other_auth),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_invite_member() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Shared").await;
    let (other, other_token) = ctx.second_user().await.unwrap();

    // First invite succeeds
    let request = json_request(
        "POST",
        &format!("/boards/{}/members", board_id),
        Some(&ctx.auth_header()),
        Some(json!({ "email": other.email })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The invited user can now read the board
    let request = json_request(
        "GET",
        &format!("/boards/{}", board_id),
        Some(&format!("Bearer {}", other_token)),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Second invite of the same email conflicts, membership count unchanged
    let before = BoardMember::count_for_board(&ctx.db, board_id).await.unwrap();
    let request = json_request(
        "POST",
        &format!("/boards/{}/members", board_id),
        Some(&ctx.auth_header()),
        Some(json!({ "email": other.email })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let after = BoardMember::count_for_board(&ctx.db, board_id).await.unwrap();
    assert_eq!(before, after);

    // Unknown email is 404
    let request = json_request(
        "POST",
        &format!("/boards/{}/members", board_id),
        Some(&ctx.auth_header()),
        Some(json!({ "email": "nobody@example.com" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_partial_update_preserves_other_fields() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;
    let (list_id, _) = create_list(&mut ctx, board_id, "Todo").await;
    let (card_id, _) = create_card(&mut ctx, list_id, "task1").await;

    // Set only the description
    let request = json_request(
        "PUT",
        &format!("/cards/{}/details", card_id),
        Some(&ctx.auth_header()),
        Some(json!({ "description": "notes" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = json_request(
        "GET",
        &format!("/cards/{}/details", card_id),
        Some(&ctx.auth_header()),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["content"], "task1");
    assert_eq!(body["description"], "notes");
    assert!(body["due_date"].is_null());

    // Set and then clear the due date; description stays
    let request = json_request(
        "PUT",
        &format!("/cards/{}/details", card_id),
        Some(&ctx.auth_header()),
        Some(json!({ "due_date": "2026-01-15" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = json_request(
        "PUT",
        &format!("/cards/{}/details", card_id),
        Some(&ctx.auth_header()),
        Some(json!({ "due_date": null })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = json_request(
        "GET",
        &format!("/cards/{}/details", card_id),
        Some(&ctx.auth_header()),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["content"], "task1");
    assert_eq!(body["description"], "notes");
    assert!(body["due_date"].is_null());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_comments_are_attributed_and_ordered() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;
    let (list_id, _) = create_list(&mut ctx, board_id, "Todo").await;
    let (card_id, _) = create_card(&mut ctx, list_id, "task1").await;

    let request = json_request(
        "POST",
        "/comments",
        Some(&ctx.auth_header()),
        Some(json!({ "card_id": card_id, "text": "first" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["text"], "first");
    assert_eq!(body["email"], ctx.user.email);

    let request = json_request(
        "POST",
        "/comments",
        Some(&ctx.auth_header()),
        Some(json!({ "card_id": card_id, "text": "second" })),
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Details return comments oldest-first
    let request = json_request(
        "GET",
        &format!("/cards/{}/details", card_id),
        Some(&ctx.auth_header()),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    let body = body_json(response).await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "first");
    assert_eq!(comments[1]["text"], "second");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_list_cascades_and_leaves_gaps() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Proj").await;
    let (first_id, _) = create_list(&mut ctx, board_id, "First").await;
    let (_second_id, _) = create_list(&mut ctx, board_id, "Second").await;
    create_card(&mut ctx, first_id, "doomed").await;

    let request = json_request(
        "DELETE",
        &format!("/lists/{}", first_id),
        Some(&ctx.auth_header()),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Survivor keeps its position (no renumbering); the sequence is gapped
    let board = get_board(&mut ctx, board_id).await;
    let lists = board["lists"].as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["name"], "Second");
    assert_eq!(lists[0]["position"], 1);

    // The contained card went with the list
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards WHERE list_id = $1")
        .bind(first_id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_mutations_trigger_fanout_signal() {
    let mut ctx = TestContext::new().await.unwrap();

    let board_id = create_board(&mut ctx, "Live").await;

    // Join the board's broadcast group directly through the registry
    let mut rx = ctx.channels.subscribe(board_id);

    let (list_id, _) = create_list(&mut ctx, board_id, "Todo").await;
    assert!(rx.try_recv().is_ok(), "list creation should signal the board");

    create_card(&mut ctx, list_id, "task1").await;
    assert!(rx.try_recv().is_ok(), "card creation should signal the board");

    let request = json_request(
        "DELETE",
        &format!("/lists/{}", list_id),
        Some(&ctx.auth_header()),
        None,
    );
    let response = ctx.app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_ok(), "list deletion should signal the board");

    ctx.cleanup().await.unwrap();
}
