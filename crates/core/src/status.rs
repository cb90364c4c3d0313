//! Status text formatting

use std::path::Path;

pub const DEFAULT_ICON: &str = "🖊️";
pub const DEFAULT_IDLE_TEXT: &str = "Choosing a project...";

/// How status lines are worded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFormat {
    /// Decoration placed before "Editing"; empty for none
    pub icon: String,
    /// Text shown when no file is active
    pub idle_text: String,
}

impl Default for StatusFormat {
    fn default() -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
            idle_text: DEFAULT_IDLE_TEXT.to_string(),
        }
    }
}

impl StatusFormat {
    /// Build the status line for an active file, or the idle line
    pub fn text(&self, active: Option<&Path>) -> String {
        let Some(path) = active else {
            return self.idle_text.clone();
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if self.icon.is_empty() {
            format!("Editing {}", name)
        } else {
            format!("{} Editing {}", self.icon, name)
        }
    }
}
