// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::ids::{CredentialId, UserId};
use crate::model::{Category, Credential, CredentialDraft, FilterQuery, Organization};
use crate::registry::ViewName;

/// Organization/category listing for the menu and form views. The
/// edit form's targeted fetch also carries the single credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directory {
    pub orgs: Vec<Organization>,
    pub categories: Vec<Category>,
    pub credential: Option<Credential>,
}

/// One browse fetch: the filtered credential list plus the id the
/// server reports for the requesting user (ownership gating input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPage {
    pub credentials: Vec<Credential>,
    pub user_id: UserId,
}

/// The remote credential API. Calls run to completion on the caller's
/// thread; there is no retry, cancellation, or caching at this layer.
pub trait CredentialService {
    fn fetch_directory(&mut self) -> Result<Directory>;
    fn fetch_directory_for(&mut self, id: CredentialId) -> Result<Directory>;
    fn fetch_credentials(&mut self, query: &FilterQuery) -> Result<CredentialPage>;
    fn create_credential(&mut self, draft: &CredentialDraft) -> Result<()>;
    fn replace_credential(&mut self, id: CredentialId, draft: &CredentialDraft) -> Result<()>;
    fn delete_credential(&mut self, id: CredentialId) -> Result<()>;
}

/// Host-side integration: clipboard and external-link opening.
pub trait Workbench {
    fn copy_text(&mut self, text: &str) -> Result<()>;
    fn open_url(&mut self, url: &str) -> Result<()>;
}

/// A named view that can rebuild itself from fresh server data. An
/// `update` must be idempotent (full rebuild, not a patch) and must
/// leave state untouched when the fetch fails.
pub trait View {
    fn name(&self) -> ViewName;
    fn update(&mut self, service: &mut dyn CredentialService) -> Result<()>;
}
