//! Editor surface contract.
//!
//! The editor is an external collaborator: it captures edits and displays the
//! canonical source text, and that is all it gets — evaluation outcomes never
//! flow back into it. Interactive concerns (caret handling, indentation keys,
//! highlighting) are host territory and stay out of this crate.

/// Contract between a coordinator host and whatever captures text edits.
///
/// Change notifications carry the full updated text, never a diff; the host
/// forwards that text to [`LiveCoordinator::on_change`](crate::LiveCoordinator::on_change).
pub trait EditorSurface {
    /// Text currently shown to the user.
    fn text(&self) -> &str;

    /// Controlled refresh: replace the displayed text because the host set
    /// the canonical code externally.
    fn set_text(&mut self, text: String);

    /// When disabled, user edits are dropped.
    fn is_disabled(&self) -> bool;

    /// Freeze or unfreeze editing.
    fn set_disabled(&mut self, disabled: bool);

    /// Apply one user edit carrying the full updated text. Returns the text
    /// to forward to the coordinator intake, or `None` when editing is
    /// frozen.
    fn edit(&mut self, text: String) -> Option<&str>;
}

/// Headless editor surface for tests and non-interactive hosts.
#[derive(Debug, Default, Clone)]
pub struct BufferEditor {
    text: String,
    disabled: bool,
}

impl BufferEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: false,
        }
    }
}

impl EditorSurface for BufferEditor {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    fn edit(&mut self, text: String) -> Option<&str> {
        if self.disabled {
            return None;
        }
        self.text = text;
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_carry_the_full_text() {
        let mut editor = BufferEditor::new("<p>one</p>");
        let forwarded = editor.edit("<p>two</p>".to_string()).unwrap();
        assert_eq!(forwarded, "<p>two</p>");
        assert_eq!(editor.text(), "<p>two</p>");
    }

    #[test]
    fn disabled_editor_drops_edits() {
        let mut editor = BufferEditor::new("original");
        editor.set_disabled(true);
        assert!(editor.edit("changed".to_string()).is_none());
        assert_eq!(editor.text(), "original");

        editor.set_disabled(false);
        assert!(editor.edit("changed".to_string()).is_some());
    }

    #[test]
    fn controlled_refresh_replaces_text_even_when_disabled() {
        let mut editor = BufferEditor::new("a");
        editor.set_disabled(true);
        editor.set_text("host update".to_string());
        assert_eq!(editor.text(), "host update");
    }
}
