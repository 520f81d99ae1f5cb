// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use passbook_app::{
    Category, CategoryId, Credential, CredentialDraft, CredentialId, CredentialPage,
    CredentialService, Directory, FilterQuery, OrgId, Organization, UserId,
};

/// Blocking client for the remote credential API. One call per user
/// action; no retry, no caching, timeout applied at the transport.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One round-trip to confirm the server answers at all.
    pub fn ping(&self) -> Result<()> {
        self.my_info().map(|_| ())
    }

    fn my_info(&self) -> Result<MyInfoResponse> {
        self.get_json(format!("{}/users/myinfo", self.base_url))
    }

    fn my_info_for(&self, id: CredentialId) -> Result<MyInfoResponse> {
        self.get_json(format!("{}/users/myinfo?id={}", self.base_url, id.get()))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response.json().context("decode server response")
    }

    fn expect_success(&self, response: reqwest::blocking::Response) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(())
    }
}

impl CredentialService for Client {
    fn fetch_directory(&mut self) -> Result<Directory> {
        Ok(self.my_info()?.into_directory())
    }

    fn fetch_directory_for(&mut self, id: CredentialId) -> Result<Directory> {
        let directory = self.my_info_for(id)?.into_directory();
        if directory.credential.is_none() {
            bail!("credential {} missing from directory response", id.get());
        }
        Ok(directory)
    }

    fn fetch_credentials(&mut self, query: &FilterQuery) -> Result<CredentialPage> {
        let parsed: PasswordsResponse = self.get_json(format!(
            "{}/passwords{}",
            self.base_url,
            query.to_query_string()
        ))?;
        Ok(CredentialPage {
            credentials: parsed
                .passwords
                .into_iter()
                .map(PasswordRow::into_credential)
                .collect(),
            user_id: UserId::new(parsed.user_id),
        })
    }

    fn create_credential(&mut self, draft: &CredentialDraft) -> Result<()> {
        let form = CredentialForm::from_draft(draft)?;
        let response = self
            .http
            .post(format!("{}/passwords", self.base_url))
            .form(&form)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        self.expect_success(response)
    }

    fn replace_credential(&mut self, id: CredentialId, draft: &CredentialDraft) -> Result<()> {
        let form = CredentialForm::from_draft(draft)?;
        let response = self
            .http
            .put(format!("{}/passwords/{}", self.base_url, id.get()))
            .form(&form)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        self.expect_success(response)
    }

    fn delete_credential(&mut self, id: CredentialId) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/passwords/{}", self.base_url, id.get()))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        self.expect_success(response)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check [api].base_url or PASSBOOK_API_URL ({} )",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') && !body.trim().is_empty() {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

/// `user_id` and friends arrive as a number or a quoted number
/// depending on the server's serializer; accept both.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct MyInfoResponse {
    #[serde(default)]
    orgs: Vec<OrgRow>,
    #[serde(default)]
    categories: Vec<CategoryRow>,
    #[serde(default)]
    passwords: Option<Vec<PasswordRow>>,
}

impl MyInfoResponse {
    fn into_directory(self) -> Directory {
        Directory {
            orgs: self.orgs.into_iter().map(OrgRow::into_organization).collect(),
            categories: self
                .categories
                .into_iter()
                .map(CategoryRow::into_category)
                .collect(),
            credential: self
                .passwords
                .and_then(|passwords| passwords.into_iter().next())
                .map(PasswordRow::into_credential),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrgRow {
    org_id: i64,
    org_name: String,
    #[serde(default)]
    org_icon: String,
}

impl OrgRow {
    fn into_organization(self) -> Organization {
        Organization {
            id: OrgId::new(self.org_id),
            name: self.org_name,
            icon: self.org_icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    cat_id: i64,
    cat_name: String,
    #[serde(default)]
    cat_icon: String,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::new(self.cat_id),
            name: self.cat_name,
            icon: self.cat_icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PasswordRow {
    id: i64,
    site_name: String,
    #[serde(default)]
    site_login: String,
    #[serde(default)]
    site_pwd: String,
    #[serde(default)]
    site_url: String,
    #[serde(deserialize_with = "lenient_i64")]
    creator_id: i64,
    org_id: i64,
    category_id: i64,
}

impl PasswordRow {
    fn into_credential(self) -> Credential {
        Credential {
            id: CredentialId::new(self.id),
            site_name: self.site_name,
            site_login: self.site_login,
            site_pwd: self.site_pwd,
            site_url: self.site_url,
            creator_id: UserId::new(self.creator_id),
            org_id: OrgId::new(self.org_id),
            category_id: CategoryId::new(self.category_id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PasswordsResponse {
    #[serde(default)]
    passwords: Vec<PasswordRow>,
    #[serde(deserialize_with = "lenient_i64")]
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CredentialForm<'a> {
    site_name: &'a str,
    site_url: &'a str,
    site_login: &'a str,
    site_pwd: &'a str,
    org_id: i64,
    category_id: i64,
}

impl<'a> CredentialForm<'a> {
    fn from_draft(draft: &'a CredentialDraft) -> Result<Self> {
        let org_id = draft
            .org_id
            .ok_or_else(|| anyhow!("organization is required"))?;
        let category_id = draft
            .category_id
            .ok_or_else(|| anyhow!("category is required"))?;
        Ok(Self {
            site_name: &draft.site_name,
            site_url: &draft.site_url,
            site_login: &draft.site_login,
            site_pwd: &draft.site_pwd,
            org_id: org_id.get(),
            category_id: category_id.get(),
        })
    }
}
