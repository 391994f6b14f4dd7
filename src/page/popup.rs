// src/page/popup.rs

/// The page's single detail popup. Only one disclosure is open at a time;
/// opening another just overwrites the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupState {
    visible: bool,
    content: String,
}

impl PopupState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The only mutator. Flips visibility and replaces the content, so the
    /// same call both opens (with text) and closes (with `""`).
    pub fn toggle(&mut self, content: impl Into<String>) {
        self.visible = !self.visible;
        self.content = content.into();
    }
}
