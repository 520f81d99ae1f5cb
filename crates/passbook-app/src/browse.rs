// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::ids::{CredentialId, UserId};
use crate::model::{Credential, FilterQuery};
use crate::registry::ViewName;
use crate::service::{CredentialService, View};

/// The credential list for the current query. Rows are replaced
/// wholesale on every update; nothing is cached across renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseView {
    query: FilterQuery,
    credentials: Vec<Credential>,
    user_id: UserId,
}

impl Default for BrowseView {
    fn default() -> Self {
        Self {
            query: FilterQuery::All,
            credentials: Vec::new(),
            user_id: UserId::new(0),
        }
    }
}

impl BrowseView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &FilterQuery {
        &self.query
    }

    pub fn set_query(&mut self, query: FilterQuery) {
        self.query = query;
    }

    pub fn clear_query(&mut self) {
        self.query = FilterQuery::All;
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn credential(&self, id: CredentialId) -> Option<&Credential> {
        self.credentials
            .iter()
            .find(|credential| credential.id == id)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Edit/delete affordances are available only on rows the current
    /// user created. Advisory: the server re-checks on every write.
    pub fn actions_enabled(&self, credential: &Credential) -> bool {
        credential.owned_by(self.user_id)
    }
}

impl View for BrowseView {
    fn name(&self) -> ViewName {
        ViewName::Browse
    }

    fn update(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        let page = service.fetch_credentials(&self.query)?;
        self.credentials = page.credentials;
        self.user_id = page.user_id;
        Ok(())
    }
}
