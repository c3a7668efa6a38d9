use std::collections::HashMap;
use std::fmt;

use crate::host::{ActionError, EditorContext};
use crate::menu::{ActionKey, MenuTree};

/// A toolbar action body. Runs in one dispatch turn against the context.
pub type Handler = Box<dyn Fn(&mut EditorContext) -> Result<(), ActionError>>;

/// What a plugin contributes once set up: its menus and the handlers their
/// action entries invoke.
pub struct ActionSet {
    menu: MenuTree,
    handlers: HashMap<ActionKey, Handler>,
}

impl ActionSet {
    pub fn builder(menu: MenuTree) -> ActionSetBuilder {
        ActionSetBuilder {
            menu,
            handlers: HashMap::new(),
        }
    }

    pub const fn menu(&self) -> &MenuTree {
        &self.menu
    }

    pub fn handler(&self, key: &ActionKey) -> Option<&Handler> {
        self.handlers.get(key)
    }

    pub fn into_parts(self) -> (MenuTree, HashMap<ActionKey, Handler>) {
        (self.menu, self.handlers)
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().map(ActionKey::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ActionSet")
            .field("menu", &self.menu)
            .field("handlers", &keys)
            .finish()
    }
}

/// Binds handlers to the action keys of a menu tree.
pub struct ActionSetBuilder {
    menu: MenuTree,
    handlers: HashMap<ActionKey, Handler>,
}

impl ActionSetBuilder {
    #[must_use]
    pub fn on<F>(mut self, key: &str, handler: F) -> Self
    where
        F: Fn(&mut EditorContext) -> Result<(), ActionError> + 'static,
    {
        self.handlers.insert(ActionKey::from(key), Box::new(handler));
        self
    }

    /// Finish the set.
    ///
    /// # Errors
    /// Every action entry in the menu tree must have a handler.
    pub fn build(self) -> Result<ActionSet, ActionError> {
        if let Some(key) = self
            .menu
            .action_keys()
            .find(|key| !self.handlers.contains_key(*key))
        {
            return Err(ActionError::Unbound(key.to_string()));
        }
        Ok(ActionSet {
            menu: self.menu,
            handlers: self.handlers,
        })
    }
}
