// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use passbook_api::Client;
use passbook_app::{
    CategoryId, CredentialDraft, CredentialId, CredentialService, FilterQuery, OrgId,
};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_response(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(200)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn draft() -> CredentialDraft {
    CredentialDraft {
        site_name: "intranet".to_owned(),
        site_url: "https://intranet.example.com".to_owned(),
        site_login: "alice".to_owned(),
        site_pwd: "s3cret".to_owned(),
        org_id: Some(OrgId::new(1)),
        category_id: Some(CategoryId::new(2)),
    }
}

#[test]
fn connection_error_contains_actionable_remediation() {
    let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .ping()
        .expect_err("ping should fail for unreachable endpoint");
    assert!(error.to_string().contains("PASSBOOK_API_URL"));
}

#[test]
fn directory_fetch_decodes_orgs_and_categories() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/users/myinfo");
        assert_eq!(request.method(), &Method::Get);
        request
            .respond(json_response(
                r#"{"orgs":[{"org_id":1,"org_name":"Engineering","org_icon":"wrench"}],
                    "categories":[{"cat_id":2,"cat_name":"Email","cat_icon":"envelope"}]}"#,
            ))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let directory = client.fetch_directory()?;
    assert_eq!(directory.orgs.len(), 1);
    assert_eq!(directory.orgs[0].name, "Engineering");
    assert_eq!(directory.categories[0].name, "Email");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn targeted_directory_fetch_requires_the_credential() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/users/myinfo?id=9");
        request
            .respond(json_response(r#"{"orgs":[],"categories":[],"passwords":[]}"#))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .fetch_directory_for(CredentialId::new(9))
        .expect_err("empty passwords array should fail");
    assert!(error.to_string().contains("missing from directory response"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn credential_fetch_sends_the_filter_query_string() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/passwords?type=org&val=7");
        request
            .respond(json_response(
                r#"{"passwords":[{"id":1,"site_name":"forge","site_login":"bot",
                                  "site_pwd":"s","site_url":"https://forge",
                                  "creator_id":4,"org_id":7,"category_id":2}],
                    "user_id":"4"}"#,
            ))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let page = client.fetch_credentials(&FilterQuery::Org(OrgId::new(7)))?;
    assert_eq!(page.credentials.len(), 1);
    assert_eq!(page.credentials[0].site_name, "forge");
    assert_eq!(page.user_id.get(), 4);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn create_posts_an_urlencoded_form() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/passwords");
        assert_eq!(request.method(), &Method::Post);

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("readable body");
        assert!(body.contains("site_name=intranet"));
        assert!(body.contains("site_login=alice"));
        assert!(body.contains("org_id=1"));
        assert!(body.contains("category_id=2"));

        request
            .respond(Response::from_string("").with_status_code(201))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.create_credential(&draft())?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn replace_puts_to_the_item_resource() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/passwords/12");
        assert_eq!(request.method(), &Method::Put);
        request
            .respond(Response::from_string("").with_status_code(200))
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.replace_credential(CredentialId::new(12), &draft())?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_targets_the_item_resource_and_surfaces_server_errors() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/passwords/3");
        assert_eq!(request.method(), &Method::Delete);
        request
            .respond(
                json_response(r#"{"error":"not the creator"}"#).with_status_code(403),
            )
            .expect("response should succeed");
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .delete_credential(CredentialId::new(3))
        .expect_err("403 should surface");
    let message = error.to_string();
    assert!(message.contains("403"));
    assert!(message.contains("not the creator"));

    handle.join().expect("server thread should join");
    Ok(())
}
