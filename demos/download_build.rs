//! Download build artifacts the way a pipeline agent would
//!
//! This example demonstrates:
//! - Loading configuration from agent environment variables
//! - Converting raw task inputs into a download request
//! - Subscribing to events
//! - Mapping the result to a process exit code
//!
//! ```bash
//! SYSTEM_TEAMFOUNDATIONCOLLECTIONURI=https://dev.example.com/org \
//! SYSTEM_ACCESSTOKEN=... \
//! cargo run --example download_build -- web 1234 ./artifacts [artifact-name]
//! ```

use build_artifact_dl::{ArtifactDownloader, Config, Event, TaskInputs, TaskResult};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: download_build <project> <build-id> <download-path> [artifact-name]");
        std::process::exit(2);
    }

    let inputs = TaskInputs {
        project: Some(args[0].clone()),
        build_id: args[1].clone(),
        download_path: args[2].clone().into(),
        download_type: if args.len() > 3 { "single" } else { "specific" }.to_string(),
        artifact_name: args.get(3).cloned(),
        ..TaskInputs::default()
    };

    let result = run(Config::from_env(), inputs).await;
    if let TaskResult::Failed(message) = &result {
        eprintln!("✗ {message}");
    }
    std::process::exit(result.exit_code());
}

async fn run(config: Config, inputs: TaskInputs) -> TaskResult {
    let (build, request) = match inputs.into_request() {
        Ok(parsed) => parsed,
        Err(e) => return TaskResult::Failed(e.to_string()),
    };
    let downloader = match ArtifactDownloader::new(config) {
        Ok(d) => d,
        Err(e) => return TaskResult::Failed(e.to_string()),
    };

    // Subscribe to events
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ArtifactsResolved { count, pattern } => {
                    println!("Found {count} artifact(s), pattern {pattern}");
                }
                Event::TransferStarted { artifact, source } => {
                    println!("⬇ {artifact} from {source}");
                }
                Event::ArtifactSkipped {
                    artifact,
                    resource_type,
                } => {
                    println!("- {artifact} skipped ({resource_type})");
                }
                Event::TransferCompleted {
                    artifact,
                    items,
                    bytes,
                } => {
                    println!("✓ {artifact}: {items} file(s), {bytes} bytes");
                }
                Event::TransferFailed { artifact, error } => {
                    println!("✗ {artifact}: {error}");
                }
                _ => {}
            }
        }
    });

    let result = downloader.download(&build, &request).await;
    if let Ok(summary) = &result {
        println!(
            "Downloaded {} file(s) to {}",
            summary.total_items(),
            request.destination.display()
        );
    }
    TaskResult::from_result(&result)
}
