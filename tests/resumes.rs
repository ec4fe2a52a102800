mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};

use common::{Reply, TestApp};

const BOUNDARY: &str = "----interviewer-test-boundary";

async fn upload(
    app: &TestApp,
    token: &str,
    candidate: uuid::Uuid,
    content_type: &str,
    data: &[u8],
) -> Reply {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/v1/candidates/{candidate}/resume"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request");
    app.send(request).await
}

#[tokio::test]
async fn resume_upload_and_download_respect_ownership() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let globex = app.company("owner@globex.test", "Globex").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let c1 = app.candidate(&r1.token, "c1@mail.test").await;
    let resume_uri = format!("/candidates/{c1}/resume");

    let reply = app.get(&resume_uri, &r1.token).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = upload(&app, &r1.token, c1, "image/png", b"\x89PNG").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let reply = upload(&app, &globex.token, c1, "application/pdf", b"%PDF-1.7").await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = upload(&app, &r1.token, c1, "application/pdf", b"%PDF-1.7").await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["has_resume"], true);
    assert_eq!(reply.body["resume_content_type"], "application/pdf");
    assert!(reply.body.get("resume_key").is_none());

    let reply = app.get(&resume_uri, &acme.token).await;
    assert_eq!(reply.status, StatusCode::FOUND);
    let location = reply.headers[header::LOCATION].to_str().expect("location");
    assert!(location.starts_with(&format!("memory://resumes/{c1}/")));
    assert!(location.contains(".pdf"));

    let reply = app.get(&resume_uri, &globex.token).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
