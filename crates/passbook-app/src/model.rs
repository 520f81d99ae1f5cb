// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub site_name: String,
    pub site_login: String,
    pub site_pwd: String,
    pub site_url: String,
    pub creator_id: UserId,
    pub org_id: OrgId,
    pub category_id: CategoryId,
}

impl Credential {
    pub fn owned_by(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
}

/// Which subset of credentials the browse view fetches. At most one is
/// active at a time; `Search` bypasses the menu highlight entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterQuery {
    #[default]
    All,
    Own,
    Org(OrgId),
    Category(CategoryId),
    Search(String),
}

impl FilterQuery {
    /// Render the server query string (empty for the unfiltered list).
    pub fn to_query_string(&self) -> String {
        match self {
            Self::All => String::new(),
            Self::Own => "?type=own".to_owned(),
            Self::Org(id) => format!("?type=org&val={}", id.get()),
            Self::Category(id) => format!("?type=cat&val={}", id.get()),
            Self::Search(term) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
                format!("?type=search&val={encoded}")
            }
        }
    }

    pub const fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }
}

/// In-progress field values for the add/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialDraft {
    pub site_name: String,
    pub site_url: String,
    pub site_login: String,
    pub site_pwd: String,
    pub org_id: Option<OrgId>,
    pub category_id: Option<CategoryId>,
}

impl CredentialDraft {
    pub fn from_credential(credential: &Credential) -> Self {
        Self {
            site_name: credential.site_name.clone(),
            site_url: credential.site_url.clone(),
            site_login: credential.site_login.clone(),
            site_pwd: credential.site_pwd.clone(),
            org_id: Some(credential.org_id),
            category_id: Some(credential.category_id),
        }
    }

    /// Only what the form controls themselves would enforce: the select
    /// fields carry a value and the URL field holds a URL-shaped string.
    pub fn validate(&self) -> Result<()> {
        if self.org_id.is_none() {
            bail!("organization is required -- choose an organization and retry");
        }
        if self.category_id.is_none() {
            bail!("category is required -- choose a category and retry");
        }
        let url = self.site_url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("site URL must start with http:// or https://");
        }
        Ok(())
    }
}
