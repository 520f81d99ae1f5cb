// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use passbook_app::{
    Category, CategoryId, Credential, CredentialDraft, CredentialId, CredentialPage,
    CredentialService, Directory, FilterQuery, OrgId, Organization, UserId, Workbench,
};

pub const DEMO_USER: UserId = UserId::new(1);

const ORGS: [(i64, &str, &str); 4] = [
    (1, "Engineering", "wrench"),
    (2, "Finance", "coins"),
    (3, "Marketing", "bullhorn"),
    (4, "Support", "headset"),
];

const CATEGORIES: [(i64, &str, &str); 4] = [
    (1, "Email", "envelope"),
    (2, "Banking", "landmark"),
    (3, "Infrastructure", "server"),
    (4, "Social", "users"),
];

// (site, login, creator, org, category)
const CREDENTIALS: [(&str, &str, i64, i64, i64); 9] = [
    ("forge.internal", "deploy-bot", 1, 1, 3),
    ("ci.example.com", "runner", 1, 1, 3),
    ("mail.example.com", "alice", 1, 1, 1),
    ("payroll.example.com", "finance-ops", 2, 2, 2),
    ("bank.example.com", "treasurer", 2, 2, 2),
    ("ads.example.com", "campaigns", 3, 3, 4),
    ("social.example.com", "brand", 3, 3, 4),
    ("helpdesk.example.com", "agent", 4, 4, 1),
    ("status.example.com", "alice", 1, 4, 3),
];

/// In-memory credential service with the remote API's visible
/// behavior: organizations and categories are listed only while they
/// still hold at least one credential, so deleting the last row of a
/// filter makes its button vanish on the next directory fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDirectory {
    orgs: Vec<Organization>,
    categories: Vec<Category>,
    credentials: Vec<Credential>,
    user_id: UserId,
    next_id: i64,
}

impl MemoryDirectory {
    pub fn new(user_id: UserId) -> Self {
        Self {
            orgs: Vec::new(),
            categories: Vec::new(),
            credentials: Vec::new(),
            user_id,
            next_id: 1,
        }
    }

    /// The demo catalog: four organizations, four categories, nine
    /// credentials split across two creators so ownership gating is
    /// visible out of the box.
    pub fn seeded() -> Self {
        let mut directory = Self::new(DEMO_USER);
        directory.orgs = ORGS
            .iter()
            .map(|(id, name, icon)| Organization {
                id: OrgId::new(*id),
                name: (*name).to_owned(),
                icon: (*icon).to_owned(),
            })
            .collect();
        directory.categories = CATEGORIES
            .iter()
            .map(|(id, name, icon)| Category {
                id: CategoryId::new(*id),
                name: (*name).to_owned(),
                icon: (*icon).to_owned(),
            })
            .collect();
        for (site, login, creator, org, category) in CREDENTIALS {
            directory.insert(site, login, UserId::new(creator), OrgId::new(org), CategoryId::new(category));
        }
        directory
    }

    pub fn insert(
        &mut self,
        site_name: &str,
        site_login: &str,
        creator_id: UserId,
        org_id: OrgId,
        category_id: CategoryId,
    ) -> CredentialId {
        let id = CredentialId::new(self.next_id);
        self.next_id += 1;
        self.credentials.push(Credential {
            id,
            site_name: site_name.to_owned(),
            site_login: site_login.to_owned(),
            site_pwd: format!("{site_login}-secret"),
            site_url: format!("https://{site_name}"),
            creator_id,
            org_id,
            category_id,
        });
        id
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    fn org_in_use(&self, id: OrgId) -> bool {
        self.credentials
            .iter()
            .any(|credential| credential.org_id == id)
    }

    fn category_in_use(&self, id: CategoryId) -> bool {
        self.credentials
            .iter()
            .any(|credential| credential.category_id == id)
    }

    fn listing(&self) -> Directory {
        Directory {
            orgs: self
                .orgs
                .iter()
                .filter(|org| self.org_in_use(org.id))
                .cloned()
                .collect(),
            categories: self
                .categories
                .iter()
                .filter(|category| self.category_in_use(category.id))
                .cloned()
                .collect(),
            credential: None,
        }
    }

    fn matches(credential: &Credential, query: &FilterQuery, user_id: UserId) -> bool {
        match query {
            FilterQuery::All => true,
            FilterQuery::Own => credential.creator_id == user_id,
            FilterQuery::Org(id) => credential.org_id == *id,
            FilterQuery::Category(id) => credential.category_id == *id,
            FilterQuery::Search(term) => {
                let term = term.to_lowercase();
                credential.site_name.to_lowercase().contains(&term)
                    || credential.site_login.to_lowercase().contains(&term)
            }
        }
    }
}

impl CredentialService for MemoryDirectory {
    fn fetch_directory(&mut self) -> Result<Directory> {
        Ok(self.listing())
    }

    fn fetch_directory_for(&mut self, id: CredentialId) -> Result<Directory> {
        let mut directory = self.listing();
        directory.credential = self
            .credentials
            .iter()
            .find(|credential| credential.id == id)
            .cloned();
        if directory.credential.is_none() {
            bail!("credential {} not found", id.get());
        }
        Ok(directory)
    }

    fn fetch_credentials(&mut self, query: &FilterQuery) -> Result<CredentialPage> {
        let user_id = self.user_id;
        Ok(CredentialPage {
            credentials: self
                .credentials
                .iter()
                .filter(|credential| Self::matches(credential, query, user_id))
                .cloned()
                .collect(),
            user_id,
        })
    }

    fn create_credential(&mut self, draft: &CredentialDraft) -> Result<()> {
        draft.validate()?;
        let org_id = draft.org_id.ok_or_else(|| anyhow!("organization required"))?;
        let category_id = draft
            .category_id
            .ok_or_else(|| anyhow!("category required"))?;
        let id = CredentialId::new(self.next_id);
        self.next_id += 1;
        self.credentials.push(Credential {
            id,
            site_name: draft.site_name.clone(),
            site_login: draft.site_login.clone(),
            site_pwd: draft.site_pwd.clone(),
            site_url: draft.site_url.clone(),
            creator_id: self.user_id,
            org_id,
            category_id,
        });
        Ok(())
    }

    fn replace_credential(&mut self, id: CredentialId, draft: &CredentialDraft) -> Result<()> {
        draft.validate()?;
        let credential = self
            .credentials
            .iter_mut()
            .find(|credential| credential.id == id)
            .ok_or_else(|| anyhow!("credential {} not found", id.get()))?;
        credential.site_name = draft.site_name.clone();
        credential.site_login = draft.site_login.clone();
        credential.site_pwd = draft.site_pwd.clone();
        credential.site_url = draft.site_url.clone();
        if let Some(org_id) = draft.org_id {
            credential.org_id = org_id;
        }
        if let Some(category_id) = draft.category_id {
            credential.category_id = category_id;
        }
        Ok(())
    }

    fn delete_credential(&mut self, id: CredentialId) -> Result<()> {
        let before = self.credentials.len();
        self.credentials.retain(|credential| credential.id != id);
        if self.credentials.len() == before {
            bail!("credential {} not found", id.get());
        }
        Ok(())
    }
}

/// Workbench fake that records instead of touching the host system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingWorkbench {
    pub copied: Vec<String>,
    pub opened: Vec<String>,
}

impl Workbench for RecordingWorkbench {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.copied.push(text.to_owned());
        Ok(())
    }

    fn open_url(&mut self, url: &str) -> Result<()> {
        self.opened.push(url.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DEMO_USER, MemoryDirectory};
    use passbook_app::{CredentialService, FilterQuery, OrgId};

    #[test]
    fn seed_lists_every_org_and_category() {
        let mut directory = MemoryDirectory::seeded();
        let listing = directory.fetch_directory().expect("in-memory fetch");
        assert_eq!(listing.orgs.len(), 4);
        assert_eq!(listing.categories.len(), 4);
    }

    #[test]
    fn orgs_vanish_with_their_last_credential() {
        let mut directory = MemoryDirectory::seeded();
        let support: Vec<_> = directory
            .credentials()
            .iter()
            .filter(|credential| credential.org_id == OrgId::new(4))
            .map(|credential| credential.id)
            .collect();
        for id in support {
            directory.delete_credential(id).expect("seeded rows");
        }

        let listing = directory.fetch_directory().expect("in-memory fetch");
        assert!(listing.orgs.iter().all(|org| org.id != OrgId::new(4)));
    }

    #[test]
    fn own_filter_matches_the_demo_user() {
        let mut directory = MemoryDirectory::seeded();
        let page = directory
            .fetch_credentials(&FilterQuery::Own)
            .expect("in-memory fetch");
        assert!(!page.credentials.is_empty());
        assert!(
            page.credentials
                .iter()
                .all(|credential| credential.creator_id == DEMO_USER)
        );
    }

    #[test]
    fn search_matches_site_name_and_login() {
        let mut directory = MemoryDirectory::seeded();
        let page = directory
            .fetch_credentials(&FilterQuery::Search("ALICE".to_owned()))
            .expect("in-memory fetch");
        assert_eq!(page.credentials.len(), 2);
    }
}
