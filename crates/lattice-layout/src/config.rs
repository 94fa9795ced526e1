#![forbid(unsafe_code)]

//! Layout configuration and the persisted tree format.
//!
//! A [`LayoutConfig`] can be loaded from JSON or TOML. Every section has a
//! default, so a config containing only `content` is valid.
//!
//! ```json
//! {
//!   "settings": { "hasHeaders": true },
//!   "dimensions": { "borderWidth": 5 },
//!   "content": [
//!     { "type": "row", "content": [
//!       { "type": "component", "componentType": "editor", "componentState": { "file": "a.rs" } },
//!       { "type": "component", "componentType": "terminal" }
//!     ]}
//!   ]
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::ItemType;

/// Behavioural switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub has_headers: bool,
    /// Ignore drag moves while the pointer is outside the layout container.
    pub constrain_drag_to_container: bool,
    pub reorder_enabled: bool,
    pub selection_enabled: bool,
    /// Popping out a component takes its whole stack along.
    pub popout_whole_stack: bool,
    pub blocked_popouts_throw_error: bool,
    pub close_popouts_on_unload: bool,
    pub show_popout_icon: bool,
    pub show_maximise_icon: bool,
    pub show_close_icon: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            has_headers: true,
            constrain_drag_to_container: true,
            reorder_enabled: true,
            selection_enabled: false,
            popout_whole_stack: false,
            blocked_popouts_throw_error: true,
            close_popouts_on_unload: true,
            show_popout_icon: true,
            show_maximise_icon: true,
            show_close_icon: true,
        }
    }
}

/// Pixel dimensions used by the sizing engine and the drag proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dimensions {
    /// Splitter thickness.
    pub border_width: u32,
    pub min_item_height: u32,
    pub min_item_width: u32,
    pub header_height: u32,
    pub drag_proxy_width: u32,
    pub drag_proxy_height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            border_width: 5,
            min_item_height: 10,
            min_item_width: 10,
            header_height: 20,
            drag_proxy_width: 300,
            drag_proxy_height: 200,
        }
    }
}

/// Gesture thresholds for tab, splitter and drag-source handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragSettings {
    pub delay_ms: u64,
    pub distance: u32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            delay_ms: 200,
            distance: 10,
        }
    }
}

impl DragSettings {
    /// Listener thresholds derived from these settings.
    #[must_use]
    pub fn listener_config(&self) -> lattice_core::DragListenerConfig {
        lattice_core::DragListenerConfig {
            delay: std::time::Duration::from_millis(self.delay_ms),
            distance: self.distance,
        }
    }
}

fn default_closable() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Persisted form of one content item.
///
/// `width`/`height` are relative sizes (0-100) among siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConfig {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "default_closable", skip_serializing_if = "is_true")]
    pub is_closable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_item_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ItemConfig>,
}

impl ItemConfig {
    fn empty(item_type: ItemType) -> Self {
        Self {
            item_type,
            id: None,
            is_closable: true,
            title: None,
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            component_type: None,
            component_state: None,
            active_item_index: None,
            content: Vec::new(),
        }
    }

    /// A component leaf.
    #[must_use]
    pub fn component(component_type: impl Into<String>) -> Self {
        Self {
            component_type: Some(component_type.into()),
            ..Self::empty(ItemType::Component)
        }
    }

    #[must_use]
    pub fn row(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::empty(ItemType::Row)
        }
    }

    #[must_use]
    pub fn column(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::empty(ItemType::Column)
        }
    }

    #[must_use]
    pub fn stack(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::empty(ItemType::Stack)
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.component_state = Some(state);
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_min_size(mut self, min_width: Option<u32>, min_height: Option<u32>) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    #[must_use]
    pub fn closable(mut self, is_closable: bool) -> Self {
        self.is_closable = is_closable;
        self
    }

    /// Wrap a component config in a stack that inherits its relative size.
    #[must_use]
    pub fn wrapped_in_stack(self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            content: vec![self],
            ..Self::empty(ItemType::Stack)
        }
    }
}

/// Top-level layout configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub settings: Settings,
    pub dimensions: Dimensions,
    pub drag: DragSettings,
    pub content: Vec<ItemConfig>,
}

impl LayoutConfig {
    /// Config with default settings and the given content.
    #[must_use]
    pub fn with_content(content: Vec<ItemConfig>) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to compact JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(ConfigError::Json)
    }

    /// Validate parameters and content shape.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.dimensions.drag_proxy_width == 0 || self.dimensions.drag_proxy_height == 0 {
            errors.push("dimensions.dragProxyWidth/Height must be > 0".into());
        }
        if self.settings.has_headers
            && self.dimensions.header_height >= self.dimensions.drag_proxy_height
        {
            errors.push(format!(
                "dimensions.headerHeight ({}) must be smaller than dragProxyHeight ({})",
                self.dimensions.header_height, self.dimensions.drag_proxy_height
            ));
        }
        if self.content.len() > 1 {
            errors.push(format!(
                "content may hold at most one root item, got {}",
                self.content.len()
            ));
        }
        for (index, item) in self.content.iter().enumerate() {
            validate_item(item, &format!("content[{index}]"), None, &mut errors);
        }
        errors
    }
}

fn validate_item(
    item: &ItemConfig,
    path: &str,
    parent: Option<ItemType>,
    errors: &mut Vec<String>,
) {
    match item.item_type {
        ItemType::Ground => errors.push(format!("{path}: 'ground' cannot appear in content")),
        ItemType::Component => {
            if item.component_type.as_deref().is_none_or(str::is_empty) {
                errors.push(format!("{path}: component is missing componentType"));
            }
            if !item.content.is_empty() {
                errors.push(format!("{path}: component cannot have content"));
            }
        }
        ItemType::Stack | ItemType::Row | ItemType::Column => {
            if parent == Some(ItemType::Stack) {
                errors.push(format!("{path}: a stack can only hold components"));
            }
        }
    }
    for size in [item.width, item.height].into_iter().flatten() {
        if !size.is_finite() || size < 0.0 {
            errors.push(format!("{path}: relative size must be a finite value >= 0"));
        }
    }
    for (index, child) in item.content.iter().enumerate() {
        validate_item(
            child,
            &format!("{path}.content[{index}]"),
            Some(item.item_type),
            errors,
        );
    }
}

/// Error loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// JSON parse or write error.
    Json(serde_json::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Toml(e) => write!(f, "TOML error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Toml(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = LayoutConfig::default();
        assert_eq!(config.dimensions.border_width, 5);
        assert_eq!(config.dimensions.min_item_width, 10);
        assert_eq!(config.dimensions.header_height, 20);
        assert_eq!(config.drag.delay_ms, 200);
        assert_eq!(config.drag.distance, 10);
        assert!(config.settings.has_headers);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = LayoutConfig::from_json_str(
            r#"{"dimensions":{"borderWidth":3},"content":[{"type":"component","componentType":"a"}]}"#,
        )
        .expect("valid json");
        assert_eq!(config.dimensions.border_width, 3);
        assert_eq!(config.dimensions.header_height, 20);
        assert_eq!(config.content[0].item_type, ItemType::Component);
        assert!(config.content[0].is_closable);
    }

    #[test]
    fn toml_settings_load() {
        let config = LayoutConfig::from_toml_str(
            r#"
            [settings]
            selectionEnabled = true

            [drag]
            delayMs = 50
            "#,
        )
        .expect("valid toml");
        assert!(config.settings.selection_enabled);
        assert_eq!(config.drag.delay_ms, 50);
        assert_eq!(config.drag.distance, 10);
    }

    #[test]
    fn component_without_type_is_invalid() {
        let mut item = ItemConfig::component("x");
        item.component_type = None;
        let errors = LayoutConfig::with_content(vec![item]).validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("componentType"));
    }

    #[test]
    fn branch_inside_a_stack_is_invalid() {
        let item = ItemConfig::stack(vec![ItemConfig::row(vec![ItemConfig::component("a")])]);
        let errors = LayoutConfig::with_content(vec![item]).validate();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("only hold components"));
    }

    #[test]
    fn ground_in_content_is_invalid() {
        let item = ItemConfig::empty(ItemType::Ground);
        let errors = LayoutConfig::with_content(vec![item]).validate();
        assert!(errors.iter().any(|e| e.contains("ground")));
    }

    #[test]
    fn item_serializes_in_persisted_shape() {
        let item = ItemConfig::component("editor")
            .with_state(serde_json::json!({ "file": "main.rs" }))
            .with_width(50.0);
        let json = serde_json::to_string(&item).expect("serializable");
        assert_eq!(
            json,
            r#"{"type":"component","width":50.0,"componentType":"editor","componentState":{"file":"main.rs"}}"#
        );
    }

    #[test]
    fn non_closable_is_written_explicitly() {
        let item = ItemConfig::stack(Vec::new()).closable(false);
        let json = serde_json::to_string(&item).expect("serializable");
        assert_eq!(json, r#"{"type":"stack","isClosable":false}"#);
    }

    #[test]
    fn wrapping_copies_relative_size() {
        let wrapped = ItemConfig::component("a").with_width(30.0).wrapped_in_stack();
        assert_eq!(wrapped.item_type, ItemType::Stack);
        assert_eq!(wrapped.width, Some(30.0));
        assert_eq!(wrapped.content[0].width, Some(30.0));
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("layout.json");
        let config = LayoutConfig::with_content(vec![ItemConfig::row(vec![
            ItemConfig::component("a").wrapped_in_stack(),
        ])]);
        std::fs::write(&path, config.to_json_string().expect("json")).expect("write");
        let loaded = LayoutConfig::from_json_file(&path).expect("load");
        assert_eq!(loaded, config);
    }
}
