// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::browse::BrowseView;
use crate::form::{FormMode, FormView};
use crate::ids::CredentialId;
use crate::menu::{MenuButton, MenuView};
use crate::model::FilterQuery;
use crate::registry::{RegistryError, ViewName, ViewRegistry};
use crate::service::{CredentialService, View, Workbench};

/// Owns the registry and the four views; every cross-view transition
/// runs through here. Views never hold references to each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub registry: ViewRegistry,
    pub menu: MenuView,
    pub browse: BrowseView,
    pub add: FormView,
    pub edit: FormView,
}

impl Workspace {
    pub fn new() -> Result<Self, RegistryError> {
        let mut registry = ViewRegistry::new();
        for name in ViewName::ALL {
            registry.register(name)?;
        }
        Ok(Self {
            registry,
            menu: MenuView::new(),
            browse: BrowseView::new(),
            add: FormView::new(FormMode::Add),
            edit: FormView::new(FormMode::Edit),
        })
    }

    /// First activation: show the menu and populate menu + browse.
    pub fn open(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        self.registry.set_view(ViewName::Menu)?;
        self.refresh(service)
    }

    /// Rebuild menu and browse from fresh server data. If the rebuild
    /// dropped the active filter button, the highlight falls back to
    /// "all" and the browse query is cleared before the refetch.
    pub fn refresh(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        self.menu.update(service)?;
        if self.menu.set_active(None) {
            self.browse.clear_query();
        }
        self.browse.update(service)
    }

    /// A menu button press. Filter buttons highlight themselves and
    /// narrow the browse view; the add button opens the add form.
    pub fn select_button(
        &mut self,
        button: MenuButton,
        service: &mut dyn CredentialService,
    ) -> Result<()> {
        if button == MenuButton::Add {
            return self.open_add(service);
        }
        let Some(query) = button.filter() else {
            return Ok(());
        };
        self.menu.set_active(Some(button));
        self.set_filter(query, service)
    }

    fn set_filter(
        &mut self,
        query: FilterQuery,
        service: &mut dyn CredentialService,
    ) -> Result<()> {
        self.registry.set_view(ViewName::Browse)?;
        self.browse.set_query(query);
        self.browse.update(service)
    }

    /// The free-text search path. The menu highlight freezes instead
    /// of force-selecting a button.
    pub fn search(&mut self, term: &str, service: &mut dyn CredentialService) -> Result<()> {
        self.menu.set_active(Some(MenuButton::Search));
        self.set_filter(FilterQuery::Search(term.to_owned()), service)
    }

    pub fn show_menu(&mut self) -> Result<()> {
        self.registry.set_view(ViewName::Menu)?;
        Ok(())
    }

    pub fn show_browse(&mut self) -> Result<()> {
        self.registry.set_view(ViewName::Browse)?;
        Ok(())
    }

    pub fn open_add(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        self.registry.set_view(ViewName::Add)?;
        self.add.update(service)
    }

    /// Switch to the edit form for one credential. The form's own
    /// update performs the fetch; no data crosses views here.
    pub fn open_edit(
        &mut self,
        id: CredentialId,
        service: &mut dyn CredentialService,
    ) -> Result<()> {
        self.edit.set_target(id);
        self.registry.set_view(ViewName::Edit)?;
        self.edit.update(service)
    }

    /// Delete a row, then rebuild menu + browse so a filter whose last
    /// credential vanished collapses back to the unfiltered list.
    pub fn delete_credential(
        &mut self,
        id: CredentialId,
        service: &mut dyn CredentialService,
    ) -> Result<()> {
        service.delete_credential(id)?;
        self.refresh(service)
    }

    /// Submit whichever form is visible, refresh siblings, and return
    /// to the browse view.
    pub fn submit_active_form(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        match self.registry.active() {
            Some(ViewName::Add) => self.add.submit(service)?,
            Some(ViewName::Edit) => self.edit.submit(service)?,
            _ => return Ok(()),
        }
        self.refresh(service)?;
        self.registry.set_view(ViewName::Browse)?;
        Ok(())
    }

    /// Abandon the visible form without submitting.
    pub fn cancel_active_form(&mut self) -> Result<()> {
        match self.registry.active() {
            Some(ViewName::Add) => self.add.clear(),
            Some(ViewName::Edit) => self.edit.clear(),
            _ => return Ok(()),
        }
        self.registry.set_view(ViewName::Browse)?;
        Ok(())
    }

    /// The form whose state the shell should render, if one is visible.
    pub fn active_form(&self) -> Option<&FormView> {
        match self.registry.active() {
            Some(ViewName::Add) => Some(&self.add),
            Some(ViewName::Edit) => Some(&self.edit),
            _ => None,
        }
    }

    pub fn active_form_mut(&mut self) -> Option<&mut FormView> {
        match self.registry.active() {
            Some(ViewName::Add) => Some(&mut self.add),
            Some(ViewName::Edit) => Some(&mut self.edit),
            _ => None,
        }
    }

    pub fn copy_login(&self, id: CredentialId, workbench: &mut dyn Workbench) -> Result<()> {
        let credential = self.fetched_credential(id)?;
        workbench.copy_text(&credential.site_login)
    }

    pub fn copy_password(&self, id: CredentialId, workbench: &mut dyn Workbench) -> Result<()> {
        let credential = self.fetched_credential(id)?;
        workbench.copy_text(&credential.site_pwd)
    }

    pub fn open_site(&self, id: CredentialId, workbench: &mut dyn Workbench) -> Result<()> {
        let credential = self.fetched_credential(id)?;
        workbench.open_url(&credential.site_url)
    }

    fn fetched_credential(&self, id: CredentialId) -> Result<&crate::model::Credential> {
        match self.browse.credential(id) {
            Some(credential) => Ok(credential),
            None => bail!("credential {} is not in the current list", id.get()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Workspace;
    use crate::ids::{CategoryId, CredentialId, OrgId, UserId};
    use crate::menu::MenuButton;
    use crate::model::{Category, Credential, CredentialDraft, FilterQuery, Organization};
    use crate::registry::ViewName;
    use crate::service::{CredentialPage, CredentialService, Directory, Workbench};
    use anyhow::{Result, anyhow, bail};

    const USER: i64 = 7;

    /// In-memory stand-in for the remote API. Organizations and
    /// categories are listed only while they still hold credentials,
    /// which is what makes filter buttons vanish after a delete.
    #[derive(Debug, Default)]
    struct StubService {
        orgs: Vec<Organization>,
        categories: Vec<Category>,
        credentials: Vec<Credential>,
        fail_fetches: bool,
    }

    impl StubService {
        fn seeded() -> Self {
            Self {
                orgs: vec![org(7, "Engineering"), org(8, "Finance")],
                categories: vec![category(3, "Email")],
                credentials: vec![
                    credential(1, "github", USER, 7, 3),
                    credential(2, "payroll", 99, 8, 3),
                ],
                fail_fetches: false,
            }
        }

        fn live_directory(&self) -> Directory {
            let orgs = self
                .orgs
                .iter()
                .filter(|org| {
                    self.credentials
                        .iter()
                        .any(|credential| credential.org_id == org.id)
                })
                .cloned()
                .collect();
            let categories = self
                .categories
                .iter()
                .filter(|category| {
                    self.credentials
                        .iter()
                        .any(|credential| credential.category_id == category.id)
                })
                .cloned()
                .collect();
            Directory {
                orgs,
                categories,
                credential: None,
            }
        }
    }

    impl CredentialService for StubService {
        fn fetch_directory(&mut self) -> Result<Directory> {
            if self.fail_fetches {
                bail!("server unreachable");
            }
            Ok(self.live_directory())
        }

        fn fetch_directory_for(&mut self, id: CredentialId) -> Result<Directory> {
            let mut directory = self.fetch_directory()?;
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
            if self.fail_fetches {
                bail!("server unreachable");
            }
            let credentials = self
                .credentials
                .iter()
                .filter(|credential| match query {
                    FilterQuery::All => true,
                    FilterQuery::Own => credential.creator_id == UserId::new(USER),
                    FilterQuery::Org(id) => credential.org_id == *id,
                    FilterQuery::Category(id) => credential.category_id == *id,
                    FilterQuery::Search(term) => credential
                        .site_name
                        .to_lowercase()
                        .contains(&term.to_lowercase()),
                })
                .cloned()
                .collect();
            Ok(CredentialPage {
                credentials,
                user_id: UserId::new(USER),
            })
        }

        fn create_credential(&mut self, draft: &CredentialDraft) -> Result<()> {
            let id = self
                .credentials
                .iter()
                .map(|credential| credential.id.get())
                .max()
                .unwrap_or(0)
                + 1;
            self.credentials.push(Credential {
                id: CredentialId::new(id),
                site_name: draft.site_name.clone(),
                site_login: draft.site_login.clone(),
                site_pwd: draft.site_pwd.clone(),
                site_url: draft.site_url.clone(),
                creator_id: UserId::new(USER),
                org_id: draft.org_id.ok_or_else(|| anyhow!("org required"))?,
                category_id: draft
                    .category_id
                    .ok_or_else(|| anyhow!("category required"))?,
            });
            Ok(())
        }

        fn replace_credential(&mut self, id: CredentialId, draft: &CredentialDraft) -> Result<()> {
            let credential = self
                .credentials
                .iter_mut()
                .find(|credential| credential.id == id)
                .ok_or_else(|| anyhow!("credential {} not found", id.get()))?;
            credential.site_name = draft.site_name.clone();
            credential.site_login = draft.site_login.clone();
            credential.site_pwd = draft.site_pwd.clone();
            credential.site_url = draft.site_url.clone();
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

    #[derive(Debug, Default)]
    struct RecordingBench {
        copied: Vec<String>,
        opened: Vec<String>,
    }

    impl Workbench for RecordingBench {
        fn copy_text(&mut self, text: &str) -> Result<()> {
            self.copied.push(text.to_owned());
            Ok(())
        }

        fn open_url(&mut self, url: &str) -> Result<()> {
            self.opened.push(url.to_owned());
            Ok(())
        }
    }

    fn org(id: i64, name: &str) -> Organization {
        Organization {
            id: OrgId::new(id),
            name: name.to_owned(),
            icon: "building".to_owned(),
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
            icon: "tag".to_owned(),
        }
    }

    fn credential(id: i64, name: &str, creator: i64, org: i64, cat: i64) -> Credential {
        Credential {
            id: CredentialId::new(id),
            site_name: name.to_owned(),
            site_login: format!("{name}-login"),
            site_pwd: format!("{name}-secret"),
            site_url: format!("https://{name}.example.com"),
            creator_id: UserId::new(creator),
            org_id: OrgId::new(org),
            category_id: CategoryId::new(cat),
        }
    }

    fn opened_workspace(service: &mut StubService) -> Workspace {
        let mut workspace = Workspace::new().expect("fresh registry");
        workspace.open(service).expect("seeded service");
        workspace
    }

    #[test]
    fn open_shows_the_menu_with_fresh_data() -> Result<()> {
        let mut service = StubService::seeded();
        let workspace = opened_workspace(&mut service);

        assert_eq!(workspace.registry.active(), Some(ViewName::Menu));
        assert_eq!(workspace.menu.orgs().len(), 2);
        assert_eq!(workspace.browse.credentials().len(), 2);
        assert_eq!(workspace.browse.user_id(), UserId::new(USER));
        Ok(())
    }

    #[test]
    fn selecting_an_org_button_narrows_browse() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        workspace.select_button(MenuButton::Org(OrgId::new(7)), &mut service)?;

        assert_eq!(workspace.registry.active(), Some(ViewName::Browse));
        assert_eq!(workspace.browse.query(), &FilterQuery::Org(OrgId::new(7)));
        assert_eq!(workspace.browse.credentials().len(), 1);
        assert!(
            workspace
                .browse
                .credentials()
                .iter()
                .all(|credential| credential.org_id == OrgId::new(7))
        );
        Ok(())
    }

    #[test]
    fn deleting_the_last_org_credential_collapses_the_filter() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        workspace.select_button(MenuButton::Org(OrgId::new(7)), &mut service)?;
        workspace.delete_credential(CredentialId::new(1), &mut service)?;

        // Organization 7 vanished from the directory, so the highlight
        // fell back to "all" and browse shows the unfiltered list.
        assert_eq!(workspace.menu.active(), MenuButton::All);
        assert_eq!(workspace.browse.query(), &FilterQuery::All);
        assert_eq!(workspace.browse.credentials().len(), 1);
        assert_eq!(
            workspace.browse.credentials()[0].id,
            CredentialId::new(2)
        );
        Ok(())
    }

    #[test]
    fn deleting_with_other_org_rows_left_keeps_the_filter() -> Result<()> {
        let mut service = StubService::seeded();
        service
            .credentials
            .push(credential(3, "wiki", USER, 7, 3));
        let mut workspace = opened_workspace(&mut service);

        workspace.select_button(MenuButton::Org(OrgId::new(7)), &mut service)?;
        workspace.delete_credential(CredentialId::new(1), &mut service)?;

        assert_eq!(workspace.menu.active(), MenuButton::Org(OrgId::new(7)));
        assert_eq!(workspace.browse.query(), &FilterQuery::Org(OrgId::new(7)));
        assert_eq!(workspace.browse.credentials().len(), 1);
        Ok(())
    }

    #[test]
    fn search_narrows_browse_without_touching_the_highlight_buttons() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        workspace.search("pay", &mut service)?;

        assert_eq!(workspace.menu.active(), MenuButton::Search);
        assert_eq!(
            workspace.browse.query(),
            &FilterQuery::Search("pay".to_owned())
        );
        assert_eq!(workspace.browse.credentials().len(), 1);

        // A later rebuild leaves the frozen search state alone.
        workspace.refresh(&mut service)?;
        assert_eq!(workspace.menu.active(), MenuButton::Search);
        assert!(workspace.browse.query().is_search());
        Ok(())
    }

    #[test]
    fn add_form_submit_returns_to_browse_with_the_new_row() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        workspace.select_button(MenuButton::Add, &mut service)?;
        assert_eq!(workspace.registry.active(), Some(ViewName::Add));

        // Selects were pre-populated from the fetched directory.
        assert!(workspace.add.draft().org_id.is_some());

        workspace.add.draft_mut().site_name = "intranet".to_owned();
        workspace.add.draft_mut().site_login = "alice".to_owned();
        workspace.submit_active_form(&mut service)?;

        assert_eq!(workspace.registry.active(), Some(ViewName::Browse));
        assert!(workspace.add.draft().site_name.is_empty());
        assert_eq!(workspace.browse.credentials().len(), 3);
        Ok(())
    }

    #[test]
    fn edit_form_loads_the_target_and_replaces_on_submit() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        workspace.open_edit(CredentialId::new(1), &mut service)?;
        assert_eq!(workspace.registry.active(), Some(ViewName::Edit));
        assert_eq!(workspace.edit.draft().site_name, "github");

        workspace.edit.draft_mut().site_name = "github-enterprise".to_owned();
        workspace.submit_active_form(&mut service)?;

        assert_eq!(workspace.registry.active(), Some(ViewName::Browse));
        assert!(
            service
                .credentials
                .iter()
                .any(|credential| credential.site_name == "github-enterprise")
        );
        Ok(())
    }

    #[test]
    fn cancel_clears_the_form_without_submitting() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        workspace.select_button(MenuButton::Add, &mut service)?;
        workspace.add.draft_mut().site_name = "scratch".to_owned();
        workspace.cancel_active_form()?;

        assert_eq!(workspace.registry.active(), Some(ViewName::Browse));
        assert!(workspace.add.draft().site_name.is_empty());
        assert_eq!(service.credentials.len(), 2);
        Ok(())
    }

    #[test]
    fn failed_fetch_leaves_previous_state_in_place() -> Result<()> {
        let mut service = StubService::seeded();
        let mut workspace = opened_workspace(&mut service);

        service.fail_fetches = true;
        assert!(workspace.refresh(&mut service).is_err());

        // The previous render is still there, untouched.
        assert_eq!(workspace.menu.orgs().len(), 2);
        assert_eq!(workspace.browse.credentials().len(), 2);
        Ok(())
    }

    #[test]
    fn clipboard_and_link_actions_route_through_the_workbench() -> Result<()> {
        let mut service = StubService::seeded();
        let workspace = opened_workspace(&mut service);
        let mut bench = RecordingBench::default();

        workspace.copy_login(CredentialId::new(1), &mut bench)?;
        workspace.copy_password(CredentialId::new(1), &mut bench)?;
        workspace.open_site(CredentialId::new(1), &mut bench)?;

        assert_eq!(bench.copied, vec!["github-login", "github-secret"]);
        assert_eq!(bench.opened, vec!["https://github.example.com"]);

        assert!(
            workspace
                .copy_login(CredentialId::new(42), &mut bench)
                .is_err()
        );
        Ok(())
    }
}
