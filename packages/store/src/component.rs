//! Components: reusable, typed content payloads.
//!
//! Configuration is a tagged enum with one variant per component type, so
//! consumers switch exhaustively instead of duck-typing a loose map. The
//! resolver still hands renderers a flat map; [`ComponentConfig::to_map`]
//! is that projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use trellis_common::{CompId, ConfigMap};

/// The closed set of component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Section,
    Link,
    PlainText,
    Alert,
    Markdown,
    Image,
    Video,
    Pdf,
    ExperienceCard,
    TagList,
    ListContainer,
    StyleContainer,
    ViewContainer,
}

impl ComponentType {
    /// Container types may hold child nodes; every other type is a leaf and
    /// renders with an empty child list no matter what the tree says.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ComponentType::ListContainer
                | ComponentType::StyleContainer
                | ComponentType::ViewContainer
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Section => "section",
            ComponentType::Link => "link",
            ComponentType::PlainText => "plain-text",
            ComponentType::Alert => "alert",
            ComponentType::Markdown => "markdown",
            ComponentType::Image => "image",
            ComponentType::Video => "video",
            ComponentType::Pdf => "pdf",
            ComponentType::ExperienceCard => "experience-card",
            ComponentType::TagList => "tag-list",
            ComponentType::ListContainer => "list-container",
            ComponentType::StyleContainer => "style-container",
            ComponentType::ViewContainer => "view-container",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed configuration, one variant per component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ComponentConfig {
    /// Section heading.
    Section {
        #[serde(default)]
        text: String,
        /// Heading level: "h1", "h2" or "h3".
        #[serde(default = "default_level")]
        level: String,
    },

    /// Inline or standalone link.
    Link {
        #[serde(default)]
        label: String,
        #[serde(default)]
        href: String,
        #[serde(default)]
        external: bool,
    },

    /// Plain text without markdown processing.
    PlainText {
        #[serde(default)]
        content: String,
    },

    /// Styled alert box.
    Alert {
        #[serde(default)]
        content: String,
        /// "info", "warning", "error" or "success".
        #[serde(default = "default_variant")]
        variant: String,
    },

    /// Markdown block. `content_key` names the stored document; `content`
    /// is the inline fallback.
    Markdown {
        #[serde(default)]
        content_key: String,
        #[serde(default)]
        content: String,
    },

    Image {
        #[serde(default)]
        src: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },

    Video {
        #[serde(default)]
        src: String,
        #[serde(default)]
        caption: Option<String>,
    },

    Pdf {
        #[serde(default)]
        src: String,
        #[serde(default)]
        title: Option<String>,
    },

    /// Work-experience card.
    ExperienceCard {
        #[serde(default)]
        position: String,
        #[serde(default)]
        company: String,
        #[serde(default)]
        start_date: String,
        #[serde(default)]
        end_date: String,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        content: String,
    },

    /// Tag chips, sourced from a view's tags or a custom list.
    TagList {
        #[serde(default = "default_tag_source")]
        source_type: String,
        #[serde(default)]
        tag_ids: Vec<u32>,
    },

    /// Ordered list of child blocks.
    ListContainer {
        /// What the children are: "view" or "tag".
        #[serde(default = "default_list_type")]
        list_type: String,
        /// "list", "grid" or "cards".
        #[serde(default = "default_display_mode")]
        display_mode: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_true")]
        show_name: bool,
    },

    /// Styling wrapper around child blocks.
    StyleContainer {
        #[serde(default)]
        is_transparent: bool,
    },

    /// A routable page. The root container of a view tree.
    ViewContainer {
        #[serde(default)]
        path: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        browser_title: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        is_home: bool,
        #[serde(default)]
        tag_ids: Vec<u32>,
    },
}

fn default_level() -> String {
    "h1".to_string()
}

fn default_variant() -> String {
    "info".to_string()
}

fn default_tag_source() -> String {
    "custom".to_string()
}

fn default_list_type() -> String {
    "view".to_string()
}

fn default_display_mode() -> String {
    "list".to_string()
}

fn default_true() -> bool {
    true
}

impl ComponentConfig {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentConfig::Section { .. } => ComponentType::Section,
            ComponentConfig::Link { .. } => ComponentType::Link,
            ComponentConfig::PlainText { .. } => ComponentType::PlainText,
            ComponentConfig::Alert { .. } => ComponentType::Alert,
            ComponentConfig::Markdown { .. } => ComponentType::Markdown,
            ComponentConfig::Image { .. } => ComponentType::Image,
            ComponentConfig::Video { .. } => ComponentType::Video,
            ComponentConfig::Pdf { .. } => ComponentType::Pdf,
            ComponentConfig::ExperienceCard { .. } => ComponentType::ExperienceCard,
            ComponentConfig::TagList { .. } => ComponentType::TagList,
            ComponentConfig::ListContainer { .. } => ComponentType::ListContainer,
            ComponentConfig::StyleContainer { .. } => ComponentType::StyleContainer,
            ComponentConfig::ViewContainer { .. } => ComponentType::ViewContainer,
        }
    }

    /// Project to the flat map renderers consume. The `type` tag is carried
    /// separately on the resolved node, so it is stripped here.
    pub fn to_map(&self) -> ConfigMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                map.remove("type");
                map
            }
            // Struct variants always serialize to objects.
            _ => ConfigMap::new(),
        }
    }
}

/// A reusable content payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub comp_id: CompId,
    #[serde(flatten)]
    pub config: ComponentConfig,
    /// Live references pointing at this component. Maintained by
    /// [`crate::ContentGraph`], not by hand.
    pub reference_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Component {
    pub fn new(comp_id: CompId, config: ComponentConfig) -> Self {
        let now = Utc::now();
        Self {
            comp_id,
            config,
            reference_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.config.component_type()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Flat map of components by ID. Cross-store invariants live in
/// [`crate::ContentGraph`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ComponentStore {
    components: HashMap<CompId, Component>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, component: Component) {
        debug!(comp_id = %component.comp_id, comp_type = %component.component_type(), "Inserting component");
        self.components.insert(component.comp_id, component);
    }

    pub fn get(&self, comp_id: CompId) -> Option<&Component> {
        self.components.get(&comp_id)
    }

    pub fn get_mut(&mut self, comp_id: CompId) -> Option<&mut Component> {
        self.components.get_mut(&comp_id)
    }

    pub fn remove(&mut self, comp_id: CompId) -> Option<Component> {
        debug!(comp_id = %comp_id, "Removing component");
        self.components.remove(&comp_id)
    }

    pub fn contains(&self, comp_id: CompId) -> bool {
        self.components.contains_key(&comp_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All components of one type, e.g. every view container on the site.
    pub fn of_type(&self, comp_type: ComponentType) -> Vec<&Component> {
        self.components
            .values()
            .filter(|c| c.component_type() == comp_type)
            .collect()
    }
}
