//! End-to-end tests: the sync engine driving the real Trello REST client
//! against a mock Trello server.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trello_sync::config::{CardAction, ListNames, ReferenceRequirement, SyncConfig};
use trello_sync::error::TrelloError;
use trello_sync::events::{CommitEvent, EventPayload, EventState, PullRequestEvent};
use trello_sync::sync::EventProcessor;
use trello_sync::trello::{TrelloApi, TrelloClient};

const BOARD: &str = "board1";

fn config(action: CardAction, lists: ListNames) -> SyncConfig {
    SyncConfig {
        card_id_pattern: "#".into(),
        api_key: SecretString::from("test-key"),
        auth_token: SecretString::from("test-token"),
        board_id: BOARD.into(),
        card_action: action,
        lists,
        max_commit_depth: 1,
        reference_requirement: ReferenceRequirement::TitleAndBranch,
    }
}

fn lists() -> ListNames {
    ListNames {
        commit: Some("Doing".into()),
        pull_request_open: Some("Review".into()),
        pull_request_closed: Some("Done".into()),
    }
}

fn client(server: &MockServer) -> Arc<dyn TrelloApi> {
    Arc::new(
        TrelloClient::new(SecretString::from("test-key"), SecretString::from("test-token"))
            .with_base_url(format!("{}/1", server.uri())),
    )
}

async fn mount_card(server: &MockServer, short_id: &str, card_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/1/boards/{BOARD}/cards/{short_id}")))
        .and(query_param("key", "test-key"))
        .and(query_param("token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": card_id })))
        .mount(server)
        .await;
}

async fn mount_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/1/boards/{BOARD}/lists")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "l-old-done", "name": "Done", "closed": true },
            { "id": "l-doing", "name": "Doing", "closed": false },
            { "id": "l-review", "name": "Review", "closed": false },
            { "id": "l-done", "name": "Done", "closed": false }
        ])))
        .mount(server)
        .await;
}

fn commit(message: &str) -> CommitEvent {
    CommitEvent {
        url: "https://github.com/o/r/commit/abc123".into(),
        message: message.into(),
        author: "Alice".into(),
    }
}

#[tokio::test]
async fn commit_comment_is_posted_and_card_moved() {
    let server = MockServer::start().await;
    mount_card(&server, "12", "card-12").await;
    mount_lists(&server).await;

    Mock::given(method("GET"))
        .and(path("/1/cards/card-12/actions"))
        .and(query_param("filter", "commentCard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/cards/card-12/actions/comments"))
        .and(body_json(json!({
            "text": "Alice: fixes #12 https://github.com/o/r/commit/abc123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "a1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/1/cards/card-12"))
        .and(body_json(json!({ "idList": "l-doing" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "card-12" })))
        .expect(1)
        .mount(&server)
        .await;

    let processor = EventProcessor::new(client(&server), &config(CardAction::Comment, lists())).unwrap();
    let summary = processor
        .process(EventPayload::default().with_commits(vec![commit("fixes #12")]))
        .await
        .unwrap();

    assert_eq!(summary.actions_written, 1);
    assert_eq!(summary.cards_moved, 1);
}

#[tokio::test]
async fn existing_attachment_is_not_duplicated() {
    let server = MockServer::start().await;
    mount_card(&server, "12", "card-12").await;
    mount_lists(&server).await;

    Mock::given(method("GET"))
        .and(path("/1/cards/card-12/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "url": "https://github.com/o/r/commit/abc123" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/cards/card-12/attachments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/1/cards/card-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "card-12" })))
        .mount(&server)
        .await;

    let processor =
        EventProcessor::new(client(&server), &config(CardAction::Attachment, lists())).unwrap();
    let summary = processor
        .process(EventPayload::default().with_commits(vec![commit("fixes #12")]))
        .await
        .unwrap();

    assert_eq!(summary.actions_already_present, 1);
    assert_eq!(summary.actions_written, 0);
}

#[tokio::test]
async fn merge_commit_attaches_to_referenced_card_and_closes_it() {
    let server = MockServer::start().await;
    mount_card(&server, "123", "card-123").await;
    mount_lists(&server).await;

    // The PR number must never be looked up as a card.
    Mock::given(method("GET"))
        .and(path(format!("/1/boards/{BOARD}/cards/7")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "card-7" })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/cards/card-123/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/cards/card-123/attachments"))
        .and(body_json(json!({ "url": "https://github.com/o/r/commit/abc123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "att" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/1/cards/card-123"))
        .and(body_json(json!({ "idList": "l-done" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "card-123" })))
        .expect(1)
        .mount(&server)
        .await;

    let processor =
        EventProcessor::new(client(&server), &config(CardAction::Attachment, lists())).unwrap();
    processor
        .process(EventPayload::default().with_commits(vec![commit(
            "Merge pull request #7 from user/fix-123\n\nFixes #123",
        )]))
        .await
        .unwrap();
}

#[tokio::test]
async fn closed_pull_request_without_closed_list_is_not_moved() {
    let server = MockServer::start().await;
    mount_card(&server, "4", "card-4").await;
    mount_lists(&server).await;

    Mock::given(method("GET"))
        .and(path("/1/cards/card-4/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/cards/card-4/attachments"))
        .and(body_json(json!({ "url": "https://github.com/o/r/pull/9" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "att" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let lists = ListNames {
        pull_request_closed: None,
        ..lists()
    };
    let processor = EventProcessor::new(client(&server), &config(CardAction::Attachment, lists)).unwrap();
    let payload = EventPayload {
        pull_request: Some(PullRequestEvent {
            url: "https://github.com/o/r/pull/9".into(),
            title: "Tidy settings #4".into(),
            state: EventState::Closed,
            head_ref: "chore/#4-settings".into(),
            user: "bob".into(),
        }),
        ..Default::default()
    };

    let summary = processor.process(payload).await.unwrap();
    assert_eq!(summary.cards_moved, 0);
}

#[tokio::test]
async fn unknown_card_does_not_stop_the_others() {
    let server = MockServer::start().await;
    mount_card(&server, "2", "card-2").await;
    mount_lists(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/1/boards/{BOARD}/cards/1")))
        .respond_with(ResponseTemplate::new(404).set_body_string("The requested resource was not found."))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/cards/card-2/attachments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/1/cards/card-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "card-2" })))
        .expect(1)
        .mount(&server)
        .await;

    let processor =
        EventProcessor::new(client(&server), &config(CardAction::Attachment, lists())).unwrap();
    let summary = processor
        .process(EventPayload::default().with_commits(vec![commit("touches #1 and #2")]))
        .await
        .unwrap();

    assert_eq!(summary.cards_resolved, 1);
    assert_eq!(summary.actions_failed, 1);
    assert_eq!(summary.cards_moved, 1);
}

#[tokio::test]
async fn client_maps_not_found_and_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/1/boards/{BOARD}/cards/404")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/1/boards/{BOARD}/lists")))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1/cards/bad/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let trello = client(&server);
    assert_eq!(trello.find_card(BOARD, "404").await.unwrap(), None);

    let err = trello.lists_on_board(BOARD).await.unwrap_err();
    match err {
        TrelloError::Status { status, body, endpoint } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
            assert!(!endpoint.contains("test-token"));
        }
        other => panic!("expected status error, got {other:?}"),
    }

    assert!(matches!(
        trello.list_attachments("bad").await,
        Err(TrelloError::Decode { .. })
    ));
}
