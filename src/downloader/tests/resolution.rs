use crate::config::EmptyArtifactsPolicy;
use crate::downloader::resolution::resolve_artifacts;
use crate::downloader::test_helpers::{FakeBuildApi, container_artifact, raw_artifact};
use crate::error::Error;
use crate::types::{ArtifactResource, BuildId, DownloadMode};

fn single(name: &str) -> DownloadMode {
    DownloadMode::Single {
        artifact_name: name.to_string(),
    }
}

fn all(pattern: Option<&str>) -> DownloadMode {
    DownloadMode::All {
        item_pattern: pattern.map(str::to_string),
    }
}

#[tokio::test]
async fn single_mode_scopes_pattern_to_the_artifact() {
    let api = FakeBuildApi::with_artifacts(vec![
        container_artifact("drop", 1, "drop"),
        container_artifact("logs", 2, "logs"),
    ]);

    let resolved = resolve_artifacts(
        &api,
        None,
        BuildId(1),
        &single("drop"),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap();

    assert_eq!(resolved.pattern, "drop/**");
    assert_eq!(resolved.artifacts.len(), 1);
    assert_eq!(resolved.artifacts[0].name, "drop");
    assert_eq!(api.calls(), ["get_artifact"]);
}

#[tokio::test]
async fn single_mode_missing_artifact_fails() {
    let api = FakeBuildApi::default();

    let err = resolve_artifacts(
        &api,
        None,
        BuildId(4),
        &single("missing"),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap_err();

    match err {
        Error::ArtifactNotFound { name, build_id } => {
            assert_eq!(name, "missing");
            assert_eq!(build_id, BuildId(4));
        }
        other => panic!("expected ArtifactNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn all_mode_defaults_to_match_everything() {
    let api = FakeBuildApi::with_artifacts(vec![
        container_artifact("a", 1, "a"),
        container_artifact("b", 2, "b"),
    ]);

    let resolved = resolve_artifacts(
        &api,
        None,
        BuildId(1),
        &all(None),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap();

    assert_eq!(resolved.pattern, "**");
    let names: Vec<_> = resolved.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["a", "b"], "service order is preserved");
}

#[tokio::test]
async fn all_mode_keeps_caller_pattern() {
    let api = FakeBuildApi::with_artifacts(vec![container_artifact("a", 1, "a")]);

    let resolved = resolve_artifacts(
        &api,
        None,
        BuildId(1),
        &all(Some("**/*.dll")),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap();

    assert_eq!(resolved.pattern, "**/*.dll");
}

#[tokio::test]
async fn all_mode_blank_pattern_falls_back_to_match_everything() {
    let api = FakeBuildApi::with_artifacts(vec![container_artifact("a", 1, "a")]);

    let resolved = resolve_artifacts(
        &api,
        None,
        BuildId(1),
        &all(Some("  ")),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap();

    assert_eq!(resolved.pattern, "**");
}

#[tokio::test]
async fn all_mode_classifies_each_artifact() {
    let api = FakeBuildApi::with_artifacts(vec![
        container_artifact("a", 1, "a"),
        raw_artifact("b", "GitRef", "refs/heads/main", None),
    ]);

    let resolved = resolve_artifacts(
        &api,
        None,
        BuildId(1),
        &all(None),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap();

    assert!(matches!(resolved.artifacts[0].resource, ArtifactResource::Container { .. }));
    assert!(matches!(
        &resolved.artifacts[1].resource,
        ArtifactResource::Unsupported { resource_type } if resource_type == "GitRef"
    ));
}

#[tokio::test]
async fn empty_build_succeeds_by_default() {
    let api = FakeBuildApi::default();

    let resolved = resolve_artifacts(
        &api,
        None,
        BuildId(1),
        &all(None),
        EmptyArtifactsPolicy::Succeed,
    )
    .await
    .unwrap();

    assert!(resolved.artifacts.is_empty());
}

#[tokio::test]
async fn empty_build_fails_under_strict_policy() {
    let api = FakeBuildApi::default();

    let err = resolve_artifacts(&api, None, BuildId(8), &all(None), EmptyArtifactsPolicy::Fail)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoArtifactsFound { build_id } if build_id == BuildId(8)));
}
