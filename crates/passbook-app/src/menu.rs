// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::ids::{CategoryId, OrgId};
use crate::model::{Category, FilterQuery, Organization};
use crate::registry::ViewName;
use crate::service::{CredentialService, View};

/// Identifier space for the menu's buttons. `Search` is a virtual
/// identifier: it has no button of its own and freezes the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Add,
    All,
    Own,
    Org(OrgId),
    Category(CategoryId),
    Search,
}

impl MenuButton {
    /// The browse query a button selects, if it is a filter button.
    pub fn filter(self) -> Option<FilterQuery> {
        match self {
            Self::All => Some(FilterQuery::All),
            Self::Own => Some(FilterQuery::Own),
            Self::Org(id) => Some(FilterQuery::Org(id)),
            Self::Category(id) => Some(FilterQuery::Category(id)),
            Self::Add | Self::Search => None,
        }
    }
}

/// The filter sidebar: static buttons plus one per organization and
/// one per category, rebuilt wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    active: MenuButton,
    orgs: Vec<Organization>,
    categories: Vec<Category>,
}

impl Default for MenuView {
    fn default() -> Self {
        Self {
            active: MenuButton::All,
            orgs: Vec::new(),
            categories: Vec::new(),
        }
    }
}

impl MenuView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> MenuButton {
        self.active
    }

    pub fn orgs(&self) -> &[Organization] {
        &self.orgs
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Buttons in render order: add, all, own, organizations, categories.
    pub fn buttons(&self) -> Vec<MenuButton> {
        let mut buttons = vec![MenuButton::Add, MenuButton::All, MenuButton::Own];
        buttons.extend(self.orgs.iter().map(|org| MenuButton::Org(org.id)));
        buttons.extend(
            self.categories
                .iter()
                .map(|category| MenuButton::Category(category.id)),
        );
        buttons
    }

    pub fn label_for(&self, button: MenuButton) -> String {
        match button {
            MenuButton::Add => "Add credential".to_owned(),
            MenuButton::All => "All credentials".to_owned(),
            MenuButton::Own => "Own credentials".to_owned(),
            MenuButton::Org(id) => self
                .orgs
                .iter()
                .find(|org| org.id == id)
                .map_or_else(|| format!("org {}", id.get()), |org| org.name.clone()),
            MenuButton::Category(id) => self
                .categories
                .iter()
                .find(|category| category.id == id)
                .map_or_else(
                    || format!("category {}", id.get()),
                    |category| category.name.clone(),
                ),
            MenuButton::Search => "Search".to_owned(),
        }
    }

    fn button_exists(&self, button: MenuButton) -> bool {
        match button {
            MenuButton::Add | MenuButton::All | MenuButton::Own => true,
            MenuButton::Org(id) => self.orgs.iter().any(|org| org.id == id),
            MenuButton::Category(id) => self.categories.iter().any(|category| category.id == id),
            MenuButton::Search => false,
        }
    }

    /// Re-resolve the highlight. Adopts `next` when given. While
    /// searching the highlight is frozen: no fallback check runs. If
    /// the active button vanished in the last rebuild, fall back to
    /// `All` and return true so the caller clears the browse query —
    /// the highlight never dangles on a removed identifier.
    pub fn set_active(&mut self, next: Option<MenuButton>) -> bool {
        if let Some(next) = next {
            self.active = next;
        }
        if self.active == MenuButton::Search {
            return false;
        }
        if !self.button_exists(self.active) {
            self.active = MenuButton::All;
            return true;
        }
        false
    }
}

impl View for MenuView {
    fn name(&self) -> ViewName {
        ViewName::Menu
    }

    fn update(&mut self, service: &mut dyn CredentialService) -> Result<()> {
        let directory = service.fetch_directory()?;
        self.orgs = directory.orgs;
        self.categories = directory.categories;
        Ok(())
    }
}
