// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};

use crate::generate::{GenerateError, GenerationPolicy};
use crate::ids::CredentialId;
use crate::model::{Category, CredentialDraft, Organization};
use crate::registry::ViewName;
use crate::service::{CredentialService, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

/// The add/edit form. Field values are rebuilt on every update (blank
/// for add, pre-populated for edit); the generation policy persists
/// across opens until the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    mode: FormMode,
    target: Option<CredentialId>,
    draft: CredentialDraft,
    orgs: Vec<Organization>,
    categories: Vec<Category>,
    policy: GenerationPolicy,
}

impl FormView {
    pub fn new(mode: FormMode) -> Self {
        Self {
            mode,
            target: None,
            draft: CredentialDraft::default(),
            orgs: Vec::new(),
            categories: Vec::new(),
            policy: GenerationPolicy::default(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn target(&self) -> Option<CredentialId> {
        self.target
    }

    pub fn set_target(&mut self, id: CredentialId) {
        self.target = Some(id);
    }

    pub fn draft(&self) -> &CredentialDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut CredentialDraft {
        &mut self.draft
    }

    pub fn orgs(&self) -> &[Organization] {
        &self.orgs
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut GenerationPolicy {
        &mut self.policy
    }

    /// Clear field values; the generation policy is left alone.
    pub fn clear(&mut self) {
        self.draft = CredentialDraft::default();
    }

    /// Run the policy and place the result into the password field.
    pub fn generate_password(&mut self) -> Result<(), GenerateError> {
        self.draft.site_pwd = self.policy.generate()?;
        Ok(())
    }

    /// Create or replace depending on mode, then clear local input.
    /// Returning to the browse view and refreshing siblings is the
    /// workspace's job.
    pub fn submit(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        self.draft.validate()?;
        match self.mode {
            FormMode::Add => service.create_credential(&self.draft)?,
            FormMode::Edit => {
                let id = self
                    .target
                    .ok_or_else(|| anyhow!("edit form has no target credential"))?;
                service.replace_credential(id, &self.draft)?;
            }
        }
        self.clear();
        Ok(())
    }
}

impl View for FormView {
    fn name(&self) -> ViewName {
        match self.mode {
            FormMode::Add => ViewName::Add,
            FormMode::Edit => ViewName::Edit,
        }
    }

    fn update(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        let directory = match self.mode {
            FormMode::Add => service.fetch_directory()?,
            FormMode::Edit => {
                let id = self
                    .target
                    .ok_or_else(|| anyhow!("edit form has no target credential"))?;
                service.fetch_directory_for(id)?
            }
        };

        self.draft = match (self.mode, &directory.credential) {
            (FormMode::Edit, Some(credential)) => CredentialDraft::from_credential(credential),
            _ => CredentialDraft::default(),
        };
        self.orgs = directory.orgs;
        self.categories = directory.categories;

        // A select control always carries a value once options exist.
        if self.draft.org_id.is_none() {
            self.draft.org_id = self.orgs.first().map(|org| org.id);
        }
        if self.draft.category_id.is_none() {
            self.draft.category_id = self.categories.first().map(|category| category.id);
        }
        Ok(())
    }
}
