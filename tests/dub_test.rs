//! Dub job submission, status relay and the server-side wait.

mod helpers;

use helpers::*;
use reqwest::multipart;
use serde_json::{json, Value};

fn video_form(language: Option<&str>) -> multipart::Form {
    let form = multipart::Form::new().part(
        "file",
        multipart::Part::bytes(b"fake video bytes".to_vec())
            .file_name("lesson.mp4")
            .mime_str("video/mp4")
            .unwrap(),
    );
    match language {
        Some(lang) => form.text("language", lang.to_string()),
        None => form,
    }
}

#[tokio::test]
async fn test_create_job_returns_job_id() {
    let (upstream, app) = start().await;
    upstream.reply("dub_create", 200, json!({ "job_id": "abc123", "status": "CREATED" }));

    let response = reqwest::Client::new()
        .post(format!("{}/api/murfdub", app))
        .multipart(video_form(Some("fr_FR")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "job_id": "abc123" }));

    let calls = upstream.calls("dub_create");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key.as_deref(), Some(DUB_KEY));
    assert_eq!(calls[0].body["target_locales"], "fr_FR");
    assert_eq!(calls[0].body["priority"], "LOW");
    assert_eq!(calls[0].body["file_name"], "lesson.mp4");
    assert_eq!(calls[0].body["file"]["size"], 16);
}

#[tokio::test]
async fn test_create_job_defaults_locale() {
    let (upstream, app) = start().await;
    upstream.reply("dub_create", 200, json!({ "job_id": "abc123" }));

    let response = reqwest::Client::new()
        .post(format!("{}/api/murfdub", app))
        .multipart(video_form(None))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(upstream.calls("dub_create")[0].body["target_locales"], "fr_FR");
}

#[tokio::test]
async fn test_create_job_without_file() {
    let (upstream, app) = start().await;

    let form = multipart::Form::new().text("language", "es_ES");
    let response = reqwest::Client::new()
        .post(format!("{}/api/murfdub", app))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No file uploaded.");
    assert!(upstream.calls("dub_create").is_empty());
}

#[tokio::test]
async fn test_create_job_surfaces_upstream_message() {
    let (upstream, app) = start().await;
    upstream.reply("dub_create", 400, json!({ "error_message": "Unsupported locale" }));

    let response = reqwest::Client::new()
        .post(format!("{}/api/murfdub", app))
        .multipart(video_form(Some("xx_XX")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unsupported locale");
}

#[tokio::test]
async fn test_create_job_without_job_id_is_failure() {
    let (upstream, app) = start().await;
    upstream.reply("dub_create", 200, json!({ "job_id": "" }));

    let response = reqwest::Client::new()
        .post(format!("{}/api/murfdub", app))
        .multipart(video_form(Some("fr_FR")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_status_requires_job_id() {
    let (upstream, app) = start().await;

    let response = reqwest::get(format!("{}/api/murfdub/status", app)).await.unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing jobId");
    assert!(upstream.calls("dub_status").is_empty());
}

#[tokio::test]
async fn test_status_relays_raw_payload() {
    let (upstream, app) = start().await;
    let payload = json!({
        "job_id": "abc123",
        "status": "IN_PROGRESS",
        "download_details": [
            { "status": "PROCESSING", "locale": "fr_FR", "download_url": null }
        ],
        "credits_used": 12
    });
    upstream.reply("dub_status", 200, payload.clone());

    let response = reqwest::get(format!("{}/api/murfdub/status?jobId=abc123", app))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, payload);

    let calls = upstream.calls("dub_status");
    assert_eq!(calls[0].path_param.as_deref(), Some("abc123"));
    assert_eq!(calls[0].api_key.as_deref(), Some(DUB_KEY));
}

#[tokio::test]
async fn test_status_upstream_error() {
    let (upstream, app) = start().await;
    upstream.reply("dub_status", 404, json!({ "error_message": "Job not found" }));

    let response = reqwest::get(format!("{}/api/murfdub/status?jobId=missing", app))
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Job not found");
}

#[tokio::test]
async fn test_wait_completes_on_second_poll() {
    let (upstream, app) = start().await;
    upstream.reply("dub_status", 200, json!({ "download_details": [] }));
    upstream.reply(
        "dub_status",
        200,
        json!({
            "download_details": [
                { "status": "COMPLETED", "locale": "fr_FR", "download_url": "https://cdn.murf.ai/out.mp4" }
            ]
        }),
    );

    let response = reqwest::get(format!(
        "{}/api/murfdub/wait?jobId=abc123&language=fr_FR",
        app
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "job_id": "abc123",
            "state": "done",
            "outputs": [{ "locale": "fr_FR", "url": "https://cdn.murf.ai/out.mp4" }]
        })
    );
    assert_eq!(upstream.calls("dub_status").len(), 2);
}

#[tokio::test]
async fn test_wait_times_out_after_attempt_cap() {
    let (upstream, app) = start().await;
    upstream.reply("dub_status", 200, json!({ "download_details": [] }));

    let response = reqwest::get(format!("{}/api/murfdub/wait?jobId=abc123", app))
        .await
        .unwrap();

    assert_eq!(response.status(), 504);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["state"], "timed_out");
    assert_eq!(body["attempts"], 3);
    assert_eq!(upstream.calls("dub_status").len(), 3);
}

#[tokio::test]
async fn test_wait_reports_failed_locale() {
    let (upstream, app) = start().await;
    upstream.reply(
        "dub_status",
        200,
        json!({
            "download_details": [{ "status": "FAILED", "locale": "de_DE", "download_url": null }]
        }),
    );

    let response = reqwest::get(format!(
        "{}/api/murfdub/wait?jobId=abc123&language=de_DE",
        app
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["state"], "failed");
    assert_eq!(body["locale"], "de_DE");
}

#[tokio::test]
async fn test_wait_requires_job_id() {
    let (_upstream, app) = start().await;

    let response = reqwest::get(format!("{}/api/murfdub/wait?language=fr_FR", app))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_second_wait_for_same_job_conflicts() {
    let (upstream, app) = start_with(|config| {
        config.dub_poll_interval_secs = 1;
        config.dub_max_poll_attempts = 2;
    })
    .await;
    upstream.reply("dub_status", 200, json!({ "download_details": [] }));
    let url = format!("{}/api/murfdub/wait?jobId=abc123", app);

    let first = tokio::spawn(reqwest::get(url.clone()));
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let second = reqwest::get(url).await.unwrap();
    assert_eq!(second.status(), 409);

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), 504);

    let health: Value = reqwest::get(format!("{}/health", app))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["active_dub_polls"], 0);
}
