//! Display-only leaf views, rendered to plain text.
//!
//! This is the host side of the injection boundary: the framework hands these views
//! descriptors with parameters merged in, and they never know where a value came from.
//! Every resource view renders all three states: a `Loading...` placeholder, an error line,
//! or the value.

pub mod onboarding;
pub mod product_info;
pub mod user_form;
pub mod user_info;

use crate::framework::{Child, ResourceProp, ResourceStatus, ViewDescriptor};
use serde::de::DeserializeOwned;

pub const LOADING: &str = "Loading...";

/// Renders one child; text children render as themselves.
pub fn render(child: &Child) -> String {
    match child {
        Child::Text(text) => text.clone(),
        Child::View(view) => render_view(view),
    }
}

/// Renders children one per line.
pub fn render_all(children: &[Child]) -> String {
    children.iter().map(render).collect::<Vec<_>>().join("\n")
}

fn render_view(view: &ViewDescriptor) -> String {
    match view.kind() {
        user_info::KIND => user_info::render(view),
        product_info::KIND => product_info::render(view),
        user_form::KIND => user_form::render(view),
        kind if kind.starts_with(onboarding::KIND_PREFIX) => onboarding::render(view),
        kind => format!("<{kind}>"),
    }
}

/// Renders the resource injected under `name` with `ready`, or its loading/error state.
fn render_resource<T: DeserializeOwned>(
    view: &ViewDescriptor,
    name: &str,
    ready: impl FnOnce(T) -> String,
) -> String {
    let Some(prop) = view.resource(name) else {
        return format!("No {name}");
    };
    match prop.status {
        ResourceStatus::Ready => match prop.decode::<T>() {
            Some(value) => ready(value),
            None => format!("Malformed {name}"),
        },
        ResourceStatus::Error => error_line(name, prop),
        ResourceStatus::Loading | ResourceStatus::Uninitialized => LOADING.to_string(),
    }
}

fn error_line(name: &str, prop: &ResourceProp) -> String {
    match &prop.error {
        Some(error) => format!("Could not load {name}: {error}"),
        None => format!("Could not load {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_views_and_text() {
        let children = vec![Child::text("Title"), ViewDescriptor::new("Sidebar").into()];
        assert_eq!(render_all(&children), "Title\n<Sidebar>");
    }
}
