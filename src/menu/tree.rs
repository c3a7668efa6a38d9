use std::collections::{HashMap, HashSet};
use std::fmt;

use super::MenuError;

const MAIN: &str = "main";
const BACK_LABEL: &str = "⬅ Back";

/// Validated menu name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(String);

impl MenuId {
    /// Create a menu id.
    ///
    /// # Errors
    /// Names must be non-empty after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, MenuError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MenuError::EmptyName);
        }
        Ok(Self(name))
    }

    /// The initial menu every tree must define.
    pub fn main() -> Self {
        Self(MAIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key naming a handler in a plugin's action set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey(String);

impl ActionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a menu entry leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Invoke the handler registered under this key.
    Action(ActionKey),
    /// Switch the current menu.
    Menu(MenuId),
}

/// A labelled menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    pub label: String,
    pub target: Target,
}

impl MenuNode {
    pub fn action(label: impl Into<String>, key: &str) -> Self {
        Self {
            label: label.into(),
            target: Target::Action(ActionKey::from(key)),
        }
    }

    pub fn submenu(label: impl Into<String>, menu: MenuId) -> Self {
        Self {
            label: label.into(),
            target: Target::Menu(menu),
        }
    }

    /// The conventional "⬅ Back" entry returning to the main menu.
    pub fn back() -> Self {
        Self::submenu(BACK_LABEL, MenuId::main())
    }
}

/// Menu name → ordered entries, with every transition known to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTree {
    order: Vec<MenuId>,
    menus: HashMap<MenuId, Vec<MenuNode>>,
}

impl MenuTree {
    pub fn builder() -> MenuTreeBuilder {
        MenuTreeBuilder::default()
    }

    /// A tree with only a main menu.
    ///
    /// # Errors
    /// Fails if any entry is a transition (only `main` exists to point at).
    pub fn single(nodes: Vec<MenuNode>) -> Result<Self, MenuError> {
        Self::builder().menu(MenuId::main(), nodes).build()
    }

    pub fn menu(&self, id: &MenuId) -> Option<&[MenuNode]> {
        self.menus.get(id).map(Vec::as_slice)
    }

    /// Menu names in definition order.
    pub fn menu_ids(&self) -> impl Iterator<Item = &MenuId> {
        self.order.iter()
    }

    /// Every action key referenced anywhere in the tree.
    pub fn action_keys(&self) -> impl Iterator<Item = &ActionKey> {
        self.order
            .iter()
            .filter_map(|id| self.menus.get(id))
            .flatten()
            .filter_map(|node| match &node.target {
                Target::Action(key) => Some(key),
                Target::Menu(_) => None,
            })
    }
}

/// Collects menus, then validates them into a [`MenuTree`].
#[derive(Debug, Default)]
pub struct MenuTreeBuilder {
    menus: Vec<(MenuId, Vec<MenuNode>)>,
}

impl MenuTreeBuilder {
    #[must_use]
    pub fn menu(mut self, id: MenuId, nodes: Vec<MenuNode>) -> Self {
        self.menus.push((id, nodes));
        self
    }

    /// Validate and build the tree.
    ///
    /// # Errors
    /// Fails on a missing `main` menu, a menu defined twice, or a transition
    /// to a menu that is not defined.
    pub fn build(self) -> Result<MenuTree, MenuError> {
        let mut seen = HashSet::new();
        for (id, _) in &self.menus {
            if !seen.insert(id.clone()) {
                return Err(MenuError::DuplicateMenu(id.clone()));
            }
        }
        if !seen.contains(&MenuId::main()) {
            return Err(MenuError::MissingMain);
        }
        for (from, nodes) in &self.menus {
            for node in nodes {
                if let Target::Menu(target) = &node.target
                    && !seen.contains(target)
                {
                    return Err(MenuError::Dangling {
                        from: from.clone(),
                        label: node.label.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
        let order = self.menus.iter().map(|(id, _)| id.clone()).collect();
        Ok(MenuTree {
            order,
            menus: self.menus.into_iter().collect(),
        })
    }
}
