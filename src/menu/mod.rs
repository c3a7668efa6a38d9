//! Hierarchical toolbar menus.
//!
//! A [`MenuTree`] is a validated graph of named menus: every transition is
//! checked against the set of menus when the tree is built, so a [`Menu`]
//! can never switch to a menu that does not exist. A [`Menu`] is the state
//! machine over that tree: exactly one current menu, changed only by
//! selecting a transition entry.

mod tree;

pub use tree::{ActionKey, MenuId, MenuNode, MenuTree, MenuTreeBuilder, Target};

/// Errors raised while building or driving menus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    #[error("menu names must not be empty")]
    EmptyName,
    #[error("menu tree has no \"main\" menu")]
    MissingMain,
    #[error("menu {0} is defined twice")]
    DuplicateMenu(MenuId),
    #[error("entry {label:?} in menu {from} points at unknown menu {target}")]
    Dangling {
        from: MenuId,
        label: String,
        target: MenuId,
    },
    #[error("entry {0} belongs to a previous rendering of the menu")]
    StaleEntry(usize),
    #[error("menu {menu} has no entry {index}")]
    NoSuchEntry { menu: MenuId, index: usize },
    #[error("no entry labelled {0:?}")]
    NoSuchLabel(String),
}

/// What selecting an entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Action,
    Transition,
}

/// One interactive entry of the rendered current menu.
///
/// Entries are tied to the rendering that produced them; after a transition
/// they are rejected with [`MenuError::StaleEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub index: usize,
    pub label: String,
    pub kind: EntryKind,
    generation: u64,
}

/// Outcome of selecting an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Run the handler for this action; the current menu is unchanged.
    Invoke(ActionKey),
    /// The current menu changed; re-render.
    Switched(MenuId),
}

/// Menu state machine over a [`MenuTree`].
#[derive(Debug, Clone)]
pub struct Menu {
    tree: MenuTree,
    current: MenuId,
    generation: u64,
}

impl Menu {
    /// Start on the tree's main menu.
    pub fn new(tree: MenuTree) -> Self {
        Self {
            tree,
            current: MenuId::main(),
            generation: 0,
        }
    }

    /// Name of the current menu.
    pub const fn current(&self) -> &MenuId {
        &self.current
    }

    /// The underlying tree.
    pub const fn tree(&self) -> &MenuTree {
        &self.tree
    }

    /// Render the current menu as a fresh list of entries.
    pub fn entries(&self) -> Vec<MenuEntry> {
        self.nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| MenuEntry {
                index,
                label: node.label.clone(),
                kind: match node.target {
                    Target::Action(_) => EntryKind::Action,
                    Target::Menu(_) => EntryKind::Transition,
                },
                generation: self.generation,
            })
            .collect()
    }

    /// Find the entry with `label` in the current menu.
    pub fn find(&self, label: &str) -> Option<MenuEntry> {
        self.entries().into_iter().find(|entry| entry.label == label)
    }

    /// Select a rendered entry.
    ///
    /// # Errors
    /// Rejects entries from an earlier rendering.
    pub fn select(&mut self, entry: &MenuEntry) -> Result<Dispatch, MenuError> {
        if entry.generation != self.generation {
            return Err(MenuError::StaleEntry(entry.index));
        }
        self.select_index(entry.index)
    }

    /// Select the entry at `index` of the current menu.
    ///
    /// # Errors
    /// Fails if the current menu has no such entry.
    pub fn select_index(&mut self, index: usize) -> Result<Dispatch, MenuError> {
        let node = self
            .nodes()
            .get(index)
            .ok_or_else(|| MenuError::NoSuchEntry {
                menu: self.current.clone(),
                index,
            })?;
        match &node.target {
            Target::Action(key) => Ok(Dispatch::Invoke(key.clone())),
            Target::Menu(target) => {
                let target = target.clone();
                tracing::debug!(from = %self.current, to = %target, "menu transition");
                self.current = target.clone();
                self.generation += 1;
                Ok(Dispatch::Switched(target))
            }
        }
    }

    /// Select the entry labelled `label` in the current menu.
    ///
    /// # Errors
    /// Fails if no entry has that label.
    pub fn select_label(&mut self, label: &str) -> Result<Dispatch, MenuError> {
        let index = self
            .nodes()
            .iter()
            .position(|node| node.label == label)
            .ok_or_else(|| MenuError::NoSuchLabel(label.to_string()))?;
        self.select_index(index)
    }

    fn nodes(&self) -> &[MenuNode] {
        self.tree.menu(&self.current).unwrap_or_default()
    }
}
