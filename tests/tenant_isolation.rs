//! Cross-tenant visibility and write rules exercised through the HTTP router.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{id, ids, TestApp};

#[tokio::test]
async fn recruiters_and_companies_only_see_their_own_candidates() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let globex = app.company("owner@globex.test", "Globex").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let r1b = app
        .member("r1b@acme.test", "RECRUITER", acme.company_id)
        .await;
    let r2 = app
        .member("r2@globex.test", "RECRUITER", globex.company_id)
        .await;

    let c1 = app.candidate(&r1.token, "c1@mail.test").await;
    let c2 = app.candidate(&r2.token, "c2@mail.test").await;

    let list = app.get("/candidates", &r1.token).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(ids(&list.body), vec![c1]);

    // a colleague in the same company does not see another recruiter's candidates
    let list = app.get("/candidates", &r1b.token).await;
    assert!(ids(&list.body).is_empty());

    let list = app.get("/candidates", &acme.token).await;
    assert_eq!(ids(&list.body), vec![c1]);
    let list = app.get("/candidates", &globex.token).await;
    assert_eq!(ids(&list.body), vec![c2]);

    let admin = app.admin().await;
    let mut all = ids(&app.get("/candidates", &admin.token).await.body);
    all.sort();
    let mut expected = vec![c1, c2];
    expected.sort();
    assert_eq!(all, expected);
}

#[tokio::test]
async fn out_of_scope_reads_look_missing_and_writes_are_forbidden() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let globex = app.company("owner@globex.test", "Globex").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let c1 = app.candidate(&r1.token, "c1@mail.test").await;
    let uri = format!("/candidates/{c1}");

    let reply = app.get(&uri, &globex.token).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "candidate not found");

    let reply = app
        .patch(&uri, &globex.token, json!({ "full_name": "Hijacked" }))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.delete(&uri, &globex.token).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // the owning company may edit
    let reply = app
        .patch(&uri, &acme.token, json!({ "full_name": "Ada King" }))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["full_name"], "Ada King");

    let reply = app.get(&uri, &r1.token).await;
    assert_eq!(reply.body["full_name"], "Ada King");
}

#[tokio::test]
async fn company_can_assign_only_its_own_recruiters() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let globex = app.company("owner@globex.test", "Globex").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let r2 = app
        .member("r2@globex.test", "RECRUITER", globex.company_id)
        .await;

    let reply = app
        .post(
            "/candidates",
            &acme.token,
            json!({ "full_name": "Grace", "email": "grace@mail.test", "recruiter_id": r1.user_id }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["recruiter_id"], r1.user_id.to_string());
    let grace = id(&reply.body);
    assert_eq!(ids(&app.get("/candidates", &r1.token).await.body), vec![grace]);

    let reply = app
        .post(
            "/candidates",
            &acme.token,
            json!({ "full_name": "Mallory", "email": "m@mail.test", "recruiter_id": r2.user_id }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // recruiters cannot hand candidates to someone else
    let reply = app
        .post(
            "/candidates",
            &r1.token,
            json!({ "full_name": "Eve", "email": "eve@mail.test", "recruiter_id": r2.user_id }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn orphaned_candidates_are_admin_only_until_assigned() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let admin = app.admin().await;

    let orphan = app.candidate(&admin.token, "orphan@mail.test").await;
    assert!(ids(&app.get("/candidates", &r1.token).await.body).is_empty());
    assert!(ids(&app.get("/candidates", &acme.token).await.body).is_empty());
    let reply = app.get(&format!("/candidates/{orphan}"), &acme.token).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.get("/admin/candidates/orphans", &admin.token).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(ids(&reply.body), vec![orphan]);
    let reply = app.get("/admin/candidates/orphans", &acme.token).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .post(
            &format!("/admin/candidates/{orphan}/assign"),
            &admin.token,
            json!({ "recruiter_id": r1.user_id }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    assert_eq!(ids(&app.get("/candidates", &r1.token).await.body), vec![orphan]);
    assert_eq!(ids(&app.get("/candidates", &acme.token).await.body), vec![orphan]);
    let reply = app.get("/admin/candidates/orphans", &admin.token).await;
    assert!(ids(&reply.body).is_empty());
}

#[tokio::test]
async fn assigning_to_a_non_recruiter_is_rejected() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let applicant = app.member("me@mail.test", "CANDIDATE", None).await;
    let orphan = app.candidate(&admin.token, "orphan@mail.test").await;

    let reply = app
        .post(
            &format!("/admin/candidates/{orphan}/assign"),
            &admin.token,
            json!({ "recruiter_id": applicant.user_id }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn candidate_accounts_see_nothing_and_cannot_write() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let c1 = app.candidate(&r1.token, "c1@mail.test").await;
    let applicant = app.member("me@mail.test", "CANDIDATE", None).await;

    let reply = app.get("/candidates", &applicant.token).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(ids(&reply.body).is_empty());
    let reply = app.get(&format!("/candidates/{c1}"), &applicant.token).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app
        .post(
            "/candidates",
            &applicant.token,
            json!({ "full_name": "Me", "email": "me2@mail.test" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn independent_agency_sees_only_its_own_candidates() {
    let app = TestApp::new();
    let agency = app.member("agency@hire.test", "HIRING_AGENCY", None).await;
    let other = app.member("other@hire.test", "HIRING_AGENCY", None).await;
    assert!(agency.company_id.is_none());

    let mine = app.candidate(&agency.token, "mine@mail.test").await;
    app.candidate(&other.token, "theirs@mail.test").await;

    assert_eq!(ids(&app.get("/candidates", &agency.token).await.body), vec![mine]);
}

#[tokio::test]
async fn company_records_are_visible_to_members_only() {
    let app = TestApp::new();
    let acme = app.company("owner@acme.test", "Acme").await;
    let globex = app.company("owner@globex.test", "Globex").await;
    let r1 = app
        .member("r1@acme.test", "RECRUITER", acme.company_id)
        .await;
    let admin = app.admin().await;
    let acme_id = acme.company_id.expect("company");
    let globex_id = globex.company_id.expect("company");

    let reply = app.get(&format!("/companies/{acme_id}"), &r1.token).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["name"], "Acme");
    let reply = app.get(&format!("/companies/{globex_id}"), &r1.token).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = app.get("/companies", &r1.token).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body[0]["id"], acme_id.to_string());
    assert_eq!(reply.body.as_array().expect("array").len(), 1);
    let reply = app
        .post(
            "/companies",
            &acme.token,
            json!({ "name": "Initech", "contact_email": "hq@initech.test" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.get("/companies", &admin.token).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body.as_array().expect("array").len(), 2);

    let reply = app
        .patch(
            &format!("/companies/{globex_id}"),
            &admin.token,
            json!({ "is_active": false }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["is_active"], false);

    let reply = app
        .call(
            axum::http::Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "email": "late@globex.test",
                "password": common::PASSWORD,
                "full_name": "Late Joiner",
                "role": "RECRUITER",
                "company_id": globex_id,
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}
