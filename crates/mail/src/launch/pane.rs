//! Single-pane / dual-pane layout selection

use serde::{Deserialize, Serialize};

/// Debug override for the pane layout, passed as `DEBUG_PANE_MODE`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebugPaneMode {
    /// Let the screen size decide
    #[default]
    None,
    /// "1"
    ForceSinglePane,
    /// "2"
    ForceDualPane,
}

impl DebugPaneMode {
    /// Parse the extra value. Only "1" and "2" are overrides.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("1") => DebugPaneMode::ForceSinglePane,
            Some("2") => DebugPaneMode::ForceDualPane,
            _ => DebugPaneMode::None,
        }
    }

    /// Value written back into extras, if any
    pub fn as_extra(&self) -> Option<&'static str> {
        match self {
            DebugPaneMode::None => None,
            DebugPaneMode::ForceSinglePane => Some("1"),
            DebugPaneMode::ForceDualPane => Some("2"),
        }
    }
}

/// Screen size class of the display the router runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenSize {
    Small,
    #[default]
    Normal,
    Large,
    #[serde(rename = "xlarge")]
    ExtraLarge,
}

impl ScreenSize {
    /// Whether the dual-pane layout fits this screen
    pub fn is_extra_large(&self) -> bool {
        matches!(self, ScreenSize::ExtraLarge)
    }

    /// Parse a size name as used in settings and environment variables
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Some(ScreenSize::Small),
            "normal" => Some(ScreenSize::Normal),
            "large" => Some(ScreenSize::Large),
            "xlarge" | "extra-large" | "extralarge" => Some(ScreenSize::ExtraLarge),
            _ => None,
        }
    }
}

/// Decide the layout. An explicit override wins over the screen size.
pub fn use_two_pane(debug: DebugPaneMode, screen: ScreenSize) -> bool {
    match debug {
        DebugPaneMode::ForceDualPane => true,
        DebugPaneMode::ForceSinglePane => false,
        DebugPaneMode::None => screen.is_extra_large(),
    }
}
