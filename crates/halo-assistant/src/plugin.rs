//! Console plugin descriptor.
//!
//! The host console renders plugin tabs through extension points. This
//! module only describes what the assistant plugin contributes; invoking the
//! factories and rendering the referenced components is up to the host.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Name under which the plugin is installed in the host.
pub const PLUGIN_NAME: &str = "ai-assistant";

/// Stable id of the assistant tab.
pub const ASSISTANT_TAB_ID: &str = "ai-assistant";

/// Label shown for the assistant tab.
pub const ASSISTANT_TAB_LABEL: &str = "AI 助手";

/// Extension points a plugin can contribute to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
pub enum ExtensionPoint {
    /// Tabs shown on the plugin's own detail page.
    #[strum(serialize = "plugin:self:tabs:create")]
    PluginSelfTabsCreate,
}

/// Handle to a UI component provided by the plugin bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentRef(pub &'static str);

/// A tab contributed to the host console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub component: ComponentRef,
}

/// A console route contributed by the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub component: ComponentRef,
}

/// Produces the tabs for an extension point when the host asks for them.
pub type TabFactory = fn() -> Vec<TabDescriptor>;

/// Everything the plugin registers with the host console.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub name: &'static str,
    /// Globally registered components.
    pub components: Vec<ComponentRef>,
    pub routes: Vec<RouteDescriptor>,
    pub extension_points: BTreeMap<ExtensionPoint, TabFactory>,
}

impl PluginDescriptor {
    /// Creates an empty descriptor.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            components: Vec::new(),
            routes: Vec::new(),
            extension_points: BTreeMap::new(),
        }
    }

    /// Registers a factory for an extension point, replacing any previous one.
    #[must_use]
    pub fn with_extension_point(mut self, point: ExtensionPoint, factory: TabFactory) -> Self {
        self.extension_points.insert(point, factory);
        self
    }

    /// Returns the factory registered for an extension point.
    pub fn extension_point(&self, point: ExtensionPoint) -> Option<TabFactory> {
        self.extension_points.get(&point).copied()
    }
}

fn assistant_tabs() -> Vec<TabDescriptor> {
    vec![TabDescriptor {
        id: ASSISTANT_TAB_ID,
        label: ASSISTANT_TAB_LABEL,
        component: ComponentRef("AiAssistantTab"),
    }]
}

/// Returns the descriptor of the assistant console plugin.
pub fn define_plugin() -> PluginDescriptor {
    PluginDescriptor::new(PLUGIN_NAME)
        .with_extension_point(ExtensionPoint::PluginSelfTabsCreate, assistant_tabs)
}
