//! Command system for keyboard-bound user actions

use serde::{Deserialize, Serialize};

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Gallery commands
    pub const GALLERY_TOGGLE_VIEW: &'static str = "gallery.toggle_view";
    pub const GALLERY_FILTER: &'static str = "gallery.filter";
    pub const GALLERY_RELOAD: &'static str = "gallery.reload";

    // Lightbox commands (only act while the viewer is open)
    pub const LIGHTBOX_CLOSE: &'static str = "lightbox.close";
    pub const LIGHTBOX_PREV: &'static str = "lightbox.prev";
    pub const LIGHTBOX_NEXT: &'static str = "lightbox.next";
    pub const LIGHTBOX_DOWNLOAD: &'static str = "lightbox.download";

    // Upload commands
    pub const UPLOAD_OPEN: &'static str = "upload.open";
    pub const UPLOAD_CLOSE: &'static str = "upload.close";

    // App commands
    pub const APP_EXIT: &'static str = "app.exit";
}

/// Command with optional parameters
#[derive(Debug, Clone)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default)]
pub struct CommandParams {
    pub string_value: Option<String>,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_string(mut self, value: &str) -> Self {
        self.params.string_value = Some(value.to_string());
        self
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }
}

/// Parse a binding entry of the form `command` or `command:argument`
pub fn parse_binding(entry: &str) -> Command {
    match entry.split_once(':') {
        Some((id, arg)) => Command::new(id).with_string(arg),
        None => Command::new(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        let cmd = parse_binding("gallery.filter:Urban");
        assert!(cmd.is(CommandId::GALLERY_FILTER));
        assert_eq!(cmd.params.string_value.as_deref(), Some("Urban"));

        let cmd = parse_binding(CommandId::LIGHTBOX_CLOSE);
        assert!(cmd.is(CommandId::LIGHTBOX_CLOSE));
        assert!(cmd.params.string_value.is_none());
    }
}
