//! Build service fixtures and wiremock mounting helpers

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Project every fixture lives in
pub const PROJECT: &str = "web";

/// Wire JSON of a container artifact with locator `#/<id>/<item_path>`
pub fn container_artifact_json(name: &str, container_id: u64, item_path: &str) -> Value {
    json!({
        "id": container_id,
        "name": name,
        "resource": {
            "type": "Container",
            "data": format!("#/{container_id}/{item_path}"),
        }
    })
}

/// Wire JSON of a file share artifact
pub fn file_share_artifact_json(name: &str, download_url: &str) -> Value {
    json!({
        "name": name,
        "resource": {
            "type": "FilePath",
            "data": download_url.trim_start_matches("file:"),
            "downloadUrl": download_url,
        }
    })
}

/// A container item
pub fn container_file(path: &str, content_location: &str, length: usize) -> Value {
    json!({
        "path": path,
        "itemType": "file",
        "contentLocation": content_location,
        "fileLength": length,
    })
}

/// A container folder
pub fn container_folder(path: &str) -> Value {
    json!({ "path": path, "itemType": "folder" })
}

/// Mount the list-artifacts endpoint of a build
pub async fn mount_artifacts(server: &MockServer, build_id: i64, artifacts: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/{PROJECT}/_apis/build/builds/{build_id}/artifacts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": artifacts.len(),
            "value": artifacts,
        })))
        .with_priority(5)
        .mount(server)
        .await;
}

/// Mount the get-artifact-by-name endpoint of a build
pub async fn mount_artifact(server: &MockServer, build_id: i64, artifact: Value) {
    let name = artifact["name"].as_str().unwrap_or_default().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/{PROJECT}/_apis/build/builds/{build_id}/artifacts")))
        .and(query_param("artifactName", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(artifact))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Mount the list-builds endpoint for a definition
pub async fn mount_builds(server: &MockServer, definition_id: i64, build_ids: &[i64]) {
    let builds: Vec<Value> = build_ids.iter().map(|id| json!({ "id": id })).collect();
    Mock::given(method("GET"))
        .and(path(format!("/{PROJECT}/_apis/build/builds")))
        .and(query_param("definitions", definition_id.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": builds.len(),
            "value": builds,
        })))
        .mount(server)
        .await;
}

/// Mount a shallow listing of `item_path` inside a container
pub async fn mount_listing(
    server: &MockServer,
    container_id: u64,
    item_path: &str,
    items: Vec<Value>,
) {
    Mock::given(method("GET"))
        .and(path(format!("/_apis/resources/Containers/{container_id}")))
        .and(query_param("itemPath", item_path))
        .and(query_param("isShallow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": items.len(),
            "value": items,
        })))
        .mount(server)
        .await;
}

/// Mount file content at `/content/<key>` and return its URL
pub async fn mount_content(server: &MockServer, key: &str, body: &[u8]) -> String {
    Mock::given(method("GET"))
        .and(path(format!("/content/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
    format!("{}/content/{key}", server.uri())
}

/// Mount a content URL that always fails and return it
pub async fn mount_broken_content(server: &MockServer, key: &str) -> String {
    Mock::given(method("GET"))
        .and(path(format!("/content/{key}")))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
    format!("{}/content/{key}", server.uri())
}
