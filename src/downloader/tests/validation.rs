use std::sync::Arc;

use crate::downloader::test_helpers::{
    FakeBuildApi, RecordingEngine, container_artifact, create_test_downloader,
};
use crate::downloader::validation::validate_build_linkage;
use crate::error::Error;
use crate::types::{BuildId, BuildReference, DefinitionId, DownloadRequest};

#[tokio::test]
async fn no_definition_skips_the_service_call() {
    let api = FakeBuildApi::default();

    validate_build_linkage(&api, None, BuildId(5), None)
        .await
        .unwrap();

    assert!(api.calls().is_empty(), "linkage check should not query builds");
}

#[tokio::test]
async fn build_listed_under_definition_passes() {
    let api = FakeBuildApi::default().with_builds(7, &[10, 20]);

    validate_build_linkage(&api, Some("proj"), BuildId(20), Some(DefinitionId(7)))
        .await
        .unwrap();

    assert_eq!(api.calls(), ["get_builds"]);
}

#[tokio::test]
async fn definition_without_builds_fails() {
    let api = FakeBuildApi::default();

    let err = validate_build_linkage(&api, None, BuildId(1), Some(DefinitionId(3)))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::NoBuildsFound { definition_id } if definition_id == DefinitionId(3)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn build_outside_definition_fails() {
    let api = FakeBuildApi::default().with_builds(7, &[10, 20]);

    let err = validate_build_linkage(&api, None, BuildId(99), Some(DefinitionId(7)))
        .await
        .unwrap_err();

    match err {
        Error::BuildDefinitionMismatch {
            build_id,
            definition_id,
        } => {
            assert_eq!(build_id, BuildId(99));
            assert_eq!(definition_id, DefinitionId(7));
        }
        other => panic!("expected BuildDefinitionMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_linkage_stops_before_resolution() {
    let api = Arc::new(
        FakeBuildApi::with_artifacts(vec![container_artifact("drop", 1, "drop")])
            .with_builds(7, &[10]),
    );
    let engine = Arc::new(RecordingEngine::new());
    let downloader = create_test_downloader(api.clone(), engine.clone());
    let temp_dir = tempfile::tempdir().unwrap();

    let build = BuildReference::new(BuildId(11)).with_definition(DefinitionId(7));
    let result = downloader
        .download(&build, &DownloadRequest::all(None, temp_dir.path()))
        .await;

    assert!(matches!(result, Err(Error::BuildDefinitionMismatch { .. })));
    assert_eq!(api.calls(), ["get_builds"], "artifacts must not be fetched");
    assert!(engine.jobs().is_empty());
}
