//! Components declared in the `[components]` table of the config file.

use serde_json::Value;
use tagmark_config::AliasConfig;
use tagmark_renderer::{Component, Components, DefaultComponent, Props, Render, RenderError};

/// Renders a tag as another element, optionally adding a class.
///
/// `<Note kind="tip">` with `element = "aside"` and `class = "note"` becomes
/// `<aside class="note" kind="tip">`. A string `class` attribute on the tag is
/// appended to the configured class.
#[derive(Clone, Debug)]
pub(crate) struct AliasComponent {
    element: String,
    class: Option<String>,
    forward_attributes: bool,
}

impl AliasComponent {
    pub(crate) fn new(config: &AliasConfig) -> Self {
        Self {
            element: config.element.clone(),
            class: config.class.clone(),
            forward_attributes: config.forward_attributes,
        }
    }

    fn class_list(&self, props: &Props<'_>) -> Option<String> {
        let forwarded = if self.forward_attributes {
            props.get_str("class")
        } else {
            None
        };
        match (self.class.as_deref(), forwarded) {
            (Some(own), Some(extra)) => Some(format!("{own} {extra}")),
            (Some(class), None) | (None, Some(class)) => Some(class.to_owned()),
            (None, None) => None,
        }
    }
}

impl Component for AliasComponent {
    fn render(&self, props: &Props<'_>, render: &mut Render<'_>) -> Result<(), RenderError> {
        let mut aliased = Props::new(&self.element, props.children());
        let class = self.class_list(props);
        let has_class = class.is_some();
        if let Some(class) = class {
            aliased = aliased.with_attr("class", Some(Value::String(class)));
        }
        if self.forward_attributes {
            for (key, value) in props.attrs() {
                if key == "class" && has_class {
                    continue;
                }
                aliased = aliased.with_attr(key, value.cloned());
            }
        }
        DefaultComponent.render(&aliased, render)
    }
}

/// Build a registry with one [`AliasComponent`] per configured tag.
pub(crate) fn alias_components<'a>(
    aliases: impl IntoIterator<Item = (&'a String, &'a AliasConfig)>,
) -> Components {
    let mut components = Components::new();
    for (tag, alias) in aliases {
        tracing::debug!(tag = %tag, element = %alias.element, "Registered alias component");
        components.insert(tag, Box::new(AliasComponent::new(alias)));
    }
    components
}
