//! Composing with media imported from cloud integrations

use chrono::{NaiveDate, NaiveDateTime};
use libbuzzconnect::api::mock::MockBackend;
use libbuzzconnect::api::{CanvaExport, CloudFile, DriveProvider, Integration};
use libbuzzconnect::service::{BuzzService, SubmitOutcome};
use libbuzzconnect::types::{ConnectedAccount, Dimensions, Platform, UserProfile};
use libbuzzconnect::Config;
use std::sync::Arc;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2030, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn instagram_backend() -> MockBackend {
    MockBackend::new()
        .with_profile(UserProfile {
            connected_platforms: vec!["instagram".to_string()],
            connected_accounts: vec![ConnectedAccount {
                platform: "instagram".to_string(),
                account_id: Some("ig-1".to_string()),
                username: Some("studio".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        })
        .with_connected(Integration::GoogleDrive)
        .with_drive_files(vec![CloudFile {
            id: "g1".to_string(),
            name: "shot.png".to_string(),
            mime_type: Some("image/png".to_string()),
            ..Default::default()
        }])
}

#[tokio::test]
async fn test_drive_import_is_posted_without_upload() {
    let backend = Arc::new(instagram_backend().with_import_dimensions(Dimensions::new(1080, 1350)));
    let service = BuzzService::with_backend(Config::default(), backend.clone());

    let mut composer = service.composer().await.unwrap();
    composer.draft_mut().content = "Fresh from the shoot".to_string();
    composer.draft_mut().instagram_story = true;
    composer.toggle_platform(Platform::Instagram);
    composer.set_account_selected(Platform::Instagram, "ig-1", true);

    let item = service
        .media()
        .import_drive_file(DriveProvider::GoogleDrive, "g1")
        .await
        .unwrap();
    assert_eq!(item.name(), "shot.png");
    assert!(!item.has_local_handle());
    let index = service.media().attach_imported(&mut composer, item).unwrap();
    assert_eq!(index, 0);

    let outcome = service.submit().submit(&mut composer, now()).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Published { .. }));

    assert_eq!(backend.calls().upload, 0);
    let created = backend.created_posts();
    assert_eq!(
        created[0].platforms,
        vec!["instagram".to_string(), "instagram_story".to_string()]
    );
    assert!(created[0].images[0].url.ends_with("/uploads/shot.png"));
    assert!(created[0].images[0].url.starts_with("https://"));
}

#[tokio::test]
async fn test_instagram_rejects_import_without_dimensions() {
    let backend = Arc::new(instagram_backend());
    let service = BuzzService::with_backend(Config::default(), backend.clone());

    let mut composer = service.composer().await.unwrap();
    composer.draft_mut().content = "Unknown size".to_string();
    composer.toggle_platform(Platform::Instagram);
    composer.set_account_selected(Platform::Instagram, "ig-1", true);
    let item = service
        .media()
        .import_drive_file(DriveProvider::GoogleDrive, "g1")
        .await
        .unwrap();
    service.media().attach_imported(&mut composer, item).unwrap();

    let err = service.submit().submit(&mut composer, now()).await.unwrap_err();
    assert_eq!(err.to_string(), "Couldn't determine dimensions for \"shot.png\".");
    assert_eq!(err.exit_code(), 3);
    assert_eq!(backend.calls().create, 0);
}

#[tokio::test]
async fn test_instagram_needs_media() {
    let backend = Arc::new(instagram_backend());
    let service = BuzzService::with_backend(Config::default(), backend.clone());

    let mut composer = service.composer().await.unwrap();
    composer.draft_mut().content = "Words only".to_string();
    composer.toggle_platform(Platform::Instagram);
    composer.set_account_selected(Platform::Instagram, "ig-1", true);

    let err = service.submit().submit(&mut composer, now()).await.unwrap_err();
    assert_eq!(err.to_string(), "Images are required for all posts");
    assert_eq!(backend.calls().create, 0);
}

#[tokio::test]
async fn test_canva_video_export() {
    let backend = Arc::new(instagram_backend());
    let service = BuzzService::with_backend(Config::default(), backend.clone());

    let item = service
        .media()
        .import_canva_design("https://www.canva.com/design/DAF123abc/view", CanvaExport::Mp4)
        .await
        .unwrap();
    assert!(item.is_video());
    assert_eq!(item.url, "https://cdn.mock/canva/DAF123abc.mp4");

    let err = service
        .media()
        .import_canva_design("   ", CanvaExport::Png)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_disconnect_updates_status() {
    let backend = Arc::new(instagram_backend());
    let service = BuzzService::with_backend(Config::default(), backend.clone());

    let before = service.media().integration_statuses().await;
    assert!(before
        .iter()
        .any(|s| s.integration == Integration::GoogleDrive && s.connected));

    service.media().disconnect(Integration::GoogleDrive).await.unwrap();

    let after = service.media().integration_statuses().await;
    assert!(after.iter().all(|s| !s.connected && s.error.is_none()));
    assert_eq!(backend.disconnected(), vec![Integration::GoogleDrive]);
}
