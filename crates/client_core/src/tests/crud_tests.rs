use super::*;
use crate::test_support::{
    requests, spawn_mock, spawn_mock_with, unreachable_api, HostCall, RecordingHost,
};
use axum::http::StatusCode;
use serde_json::json;

fn ok() -> serde_json::Value {
    json!({"status": "success", "message": "done"})
}

#[tokio::test]
async fn whitespace_rename_never_reaches_the_server() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud.rename(EntityRef::Module(ModuleId(3)), "   ").await;

    assert_eq!(
        outcome,
        CrudOutcome::Rejected("Module title cannot be empty.".to_string())
    );
    assert!(requests(&log).is_empty());
    assert_eq!(
        host.calls(),
        vec![HostCall::Alert("Module title cannot be empty.".to_string())]
    );
}

#[tokio::test]
async fn rename_posts_trimmed_title_and_reloads() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud
        .rename(EntityRef::Submodule(SubmoduleId(12)), "  Loops  ")
        .await;

    assert_eq!(outcome, CrudOutcome::Applied);
    let seen = requests(&log);
    assert_eq!(seen[0].path, "/admin/submodule/12/rename");
    assert_eq!(seen[0].body, json!({"new_title": "Loops"}));
    assert_eq!(host.calls(), vec![HostCall::Reload]);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::declining();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud.delete(EntityRef::Item(ItemId(40))).await;

    assert_eq!(outcome, CrudOutcome::Cancelled);
    assert!(requests(&log).is_empty());
    assert_eq!(
        host.calls(),
        vec![HostCall::Confirm(
            "Are you sure you want to delete this content item? This action cannot be undone."
                .to_string()
        )]
    );
}

#[tokio::test]
async fn confirmed_unlink_posts_and_reloads() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    assert_eq!(crud.unlink_item(ItemId(7)).await, CrudOutcome::Applied);
    assert_eq!(requests(&log)[0].path, "/admin/item/7/unlink");
    assert_eq!(host.reloads(), 1);
}

#[tokio::test]
async fn server_failure_alerts_and_leaves_page_alone() {
    let (api, _log) = spawn_mock(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"status": "error", "message": "database is locked"}),
    )
    .await
    .expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud.duplicate(EntityRef::Module(ModuleId(2))).await;

    assert_eq!(outcome, CrudOutcome::Failed("database is locked".to_string()));
    assert_eq!(
        host.calls(),
        vec![
            HostCall::Confirm("Duplicate this module?".to_string()),
            HostCall::Alert("Error: database is locked".to_string()),
        ]
    );
}

#[tokio::test]
async fn transport_failure_uses_generic_alert() {
    let api = unreachable_api().await.expect("api");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud.create_module("Intro").await;

    assert!(matches!(outcome, CrudOutcome::Failed(_)));
    assert_eq!(
        host.alerts(),
        vec!["An error occurred while creating the module.".to_string()]
    );
    assert_eq!(host.reloads(), 0);
}

#[tokio::test]
async fn submodule_create_carries_explicit_parent() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host);

    crud.create_submodule("Basics", SubmoduleParent::Module(ModuleId(1)))
        .await;
    crud.create_submodule("Deep dive", SubmoduleParent::Submodule(SubmoduleId(6)))
        .await;

    let seen = requests(&log);
    assert_eq!(seen[0].body, json!({"title": "Basics", "module_id": 1}));
    assert_eq!(seen[1].body, json!({"title": "Deep dive", "parent_id": 6}));
}

#[tokio::test]
async fn duplicating_an_item_is_refused_with_an_alert() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    assert_eq!(
        crud.duplicate(EntityRef::Item(ItemId(3))).await,
        CrudOutcome::Rejected("Content items cannot be duplicated.".to_string())
    );
    assert_eq!(
        host.calls(),
        vec![HostCall::Alert("Content items cannot be duplicated.".to_string())]
    );
    assert!(requests(&log).is_empty());
}

#[tokio::test]
async fn item_create_requires_both_selections() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud
        .create_item(SubmoduleId(3), Some(ContentType::Quiz), None)
        .await;
    assert!(matches!(outcome, CrudOutcome::Rejected(_)));
    assert!(requests(&log).is_empty());

    let outcome = crud
        .create_item(SubmoduleId(3), Some(ContentType::Quiz), Some(ContentId(14)))
        .await;
    assert_eq!(outcome, CrudOutcome::Applied);
    assert_eq!(
        requests(&log)[0].body,
        json!({"submodule_id": 3, "content_type": "quiz", "content_id": 14})
    );
}

#[tokio::test]
async fn toggle_publish_derives_action_from_displayed_state() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let outcome = crud
        .toggle_publish(EntityRef::Module(ModuleId(9)), true)
        .await;

    assert_eq!(outcome, CrudOutcome::Applied);
    assert_eq!(requests(&log)[0].path, "/api/toggle_publish/module/9");
    assert_eq!(
        host.calls(),
        vec![
            HostCall::Confirm("Are you sure you want to unpublish this module?".to_string()),
            HostCall::Alert("Module unpublished successfully!".to_string()),
            HostCall::Reload,
        ]
    );
}

#[tokio::test]
async fn delete_content_targets_content_endpoint() {
    let (api, log) = spawn_mock(StatusCode::OK, ok()).await.expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host);

    let outcome = crud.delete_content(ContentType::Session, ContentId(5)).await;

    assert_eq!(outcome, CrudOutcome::Applied);
    assert_eq!(requests(&log)[0].path, "/admin/content/session/5/delete");
}

#[tokio::test]
async fn content_listing_rejection_is_alerted() {
    let (api, _log) = spawn_mock_with(|recorded| {
        if recorded.path.ends_with("/quiz") {
            (
                StatusCode::OK,
                json!({"status": "success", "items": [{"id": 1, "title": "Loops quiz"}]}),
            )
        } else {
            (
                StatusCode::BAD_REQUEST,
                json!({"status": "error", "message": "Invalid content type"}),
            )
        }
    })
    .await
    .expect("mock");
    let host = RecordingHost::accepting();
    let crud = CrudController::new(api, host.clone());

    let items = crud.list_content(ContentType::Quiz).await.expect("items");
    assert_eq!(
        items,
        vec![ContentSummary {
            id: ContentId(1),
            title: "Loops quiz".to_string()
        }]
    );

    let err = crud.list_content(ContentType::Lab).await.unwrap_err();
    assert_eq!(err.server_message(), Some("Invalid content type"));
    assert_eq!(
        host.alerts(),
        vec!["Error fetching content: Invalid content type".to_string()]
    );
}
