// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewName {
    Menu,
    Browse,
    Add,
    Edit,
}

impl ViewName {
    pub const ALL: [Self; 4] = [Self::Menu, Self::Browse, Self::Add, Self::Edit];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Browse => "browse",
            Self::Add => "add",
            Self::Edit => "edit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "menu" => Some(Self::Menu),
            "browse" => Some(Self::Browse),
            "add" => Some(Self::Add),
            "edit" => Some(Self::Edit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    Duplicate(ViewName),
    Unknown(ViewName),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(name) => write!(f, "view {:?} is already registered", name.as_str()),
            Self::Unknown(name) => write!(f, "view {:?} is not registered", name.as_str()),
        }
    }
}

impl std::error::Error for RegistryError {}

/// The set of registered views and which one is currently visible.
/// Before the first activation nothing is visible; afterwards exactly
/// one view is, always the most recently requested. Activation never
/// touches view state and never triggers a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRegistry {
    registered: Vec<ViewName>,
    active: Option<ViewName>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: ViewName) -> Result<(), RegistryError> {
        if self.registered.contains(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.registered.push(name);
        Ok(())
    }

    pub fn set_view(&mut self, name: ViewName) -> Result<(), RegistryError> {
        if !self.registered.contains(&name) {
            return Err(RegistryError::Unknown(name));
        }
        self.active = Some(name);
        Ok(())
    }

    pub fn active(&self) -> Option<ViewName> {
        self.active
    }

    pub fn is_visible(&self, name: ViewName) -> bool {
        self.active == Some(name)
    }

    pub fn registered(&self) -> &[ViewName] {
        &self.registered
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistryError, ViewName, ViewRegistry};

    fn full_registry() -> ViewRegistry {
        let mut registry = ViewRegistry::new();
        for name in ViewName::ALL {
            registry.register(name).expect("fresh registration");
        }
        registry
    }

    #[test]
    fn nothing_is_visible_before_first_activation() {
        let registry = full_registry();
        assert_eq!(registry.active(), None);
        assert!(ViewName::ALL.iter().all(|name| !registry.is_visible(*name)));
    }

    #[test]
    fn double_registration_is_rejected() {
        let mut registry = full_registry();
        assert_eq!(
            registry.register(ViewName::Browse),
            Err(RegistryError::Duplicate(ViewName::Browse))
        );
    }

    #[test]
    fn activating_an_unregistered_view_is_rejected() {
        let mut registry = ViewRegistry::new();
        registry.register(ViewName::Menu).expect("fresh registration");
        assert_eq!(
            registry.set_view(ViewName::Edit),
            Err(RegistryError::Unknown(ViewName::Edit))
        );
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn exactly_one_view_is_visible_after_any_activation_sequence() {
        let mut registry = full_registry();
        for name in [
            ViewName::Menu,
            ViewName::Browse,
            ViewName::Edit,
            ViewName::Browse,
            ViewName::Add,
        ] {
            registry.set_view(name).expect("registered view");
            let visible: Vec<ViewName> = ViewName::ALL
                .into_iter()
                .filter(|candidate| registry.is_visible(*candidate))
                .collect();
            assert_eq!(visible, vec![name]);
        }
    }

    #[test]
    fn view_names_parse_round_trip() {
        for name in ViewName::ALL {
            assert_eq!(ViewName::parse(name.as_str()), Some(name));
        }
        assert_eq!(ViewName::parse("settings"), None);
    }
}
