//! Popup navigation menu

use crate::types::ClickTarget;

#[derive(Debug, Clone, Default)]
pub struct PopupMenu {
    open: bool,
}

impl PopupMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Route a click. The toggle flips the menu, clicks inside the panel
    /// (its links included) stay there, anything else closes it.
    pub fn handle_click(&mut self, target: &ClickTarget) {
        match target {
            ClickTarget::MenuToggle => {
                self.open = !self.open;
                tracing::debug!("Menu toggled: open={}", self.open);
            }
            ClickTarget::MenuPanel | ClickTarget::MenuLink(_) => {}
            _ => self.close(),
        }
    }

    pub fn close(&mut self) {
        if self.open {
            tracing::debug!("Menu closed");
        }
        self.open = false;
    }
}
