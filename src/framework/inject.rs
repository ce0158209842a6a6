//! # Child Attribute Injection
//!
//! Threads values and callbacks into child views without the views knowing where they
//! came from. Two modes:
//!
//! - **Broadcast** ([`broadcast`]): every view child gets the parameters; text passes through.
//! - **Selection** ([`select`]): only the child at one index is returned, with the parameters
//!   merged in. Every other child is left out entirely, so views that are not active are never
//!   mounted. An index past the end yields `None`, the "no active child" render.
//!
//! Both build new descriptors; the input children are never modified.

use super::descriptor::{Child, Params, ViewDescriptor};

/// Which side wins when an injected parameter collides with an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Injected values replace existing ones. Injected values are runtime state.
    #[default]
    Override,
    /// Existing values are kept; injected ones only fill gaps.
    KeepExisting,
}

impl ViewDescriptor {
    /// New descriptor with `params` merged into this one's parameters.
    pub fn merged(&self, params: &Params, strategy: MergeStrategy) -> ViewDescriptor {
        let mut view = self.clone();
        let existing = view.params_mut();
        for (name, prop) in params {
            match strategy {
                MergeStrategy::Override => {
                    existing.insert(name.clone(), prop.clone());
                }
                MergeStrategy::KeepExisting => {
                    existing
                        .entry(name.clone())
                        .or_insert_with(|| prop.clone());
                }
            }
        }
        view
    }
}

fn inject(child: &Child, params: &Params, strategy: MergeStrategy) -> Child {
    match child {
        Child::View(view) => Child::View(view.merged(params, strategy)),
        Child::Text(_) => child.clone(),
    }
}

/// Broadcast mode with injected values overriding existing ones.
pub fn broadcast(children: &[Child], params: &Params) -> Vec<Child> {
    broadcast_with(children, params, MergeStrategy::Override)
}

pub fn broadcast_with(children: &[Child], params: &Params, strategy: MergeStrategy) -> Vec<Child> {
    children
        .iter()
        .map(|child| inject(child, params, strategy))
        .collect()
}

/// Selection mode: the child at `index` with `params` merged in, or `None` past the end.
///
/// A text child at `index` is returned unchanged: it has no parameters to inject into, so
/// its step never receives the params (and never gets an `on_next`). A host that should
/// render nothing in that case checks [`Child::is_view`] on the result.
pub fn select(children: &[Child], index: usize, params: &Params) -> Option<Child> {
    children
        .get(index)
        .map(|child| inject(child, params, MergeStrategy::Override))
}

/// Presets parameters on a view; parameters the view already carries win.
pub fn partially_apply(view: &ViewDescriptor, defaults: &Params) -> ViewDescriptor {
    view.merged(defaults, MergeStrategy::KeepExisting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::descriptor::{params, Prop};
    use serde_json::{json, Value};

    fn views(n: usize) -> Vec<Child> {
        (0..n)
            .map(|i| ViewDescriptor::new(format!("Step{i}")).into())
            .collect()
    }

    #[test]
    fn test_broadcast_overrides_and_skips_text() {
        let children = vec![
            ViewDescriptor::new("UserInfo")
                .with_value("user", json!("stale"))
                .with_value("title", json!("Profile"))
                .into(),
            Child::text("plain"),
            ViewDescriptor::new("Avatar").into(),
        ];
        let injected = broadcast(&children, &params([("user", Prop::Value(json!({"name": "Ann"})))]));

        assert_eq!(injected.len(), 3);
        let first = injected[0].as_view().unwrap();
        assert_eq!(first.value("user"), Some(&json!({"name": "Ann"})));
        assert_eq!(first.value("title"), Some(&json!("Profile")));
        assert!(matches!(&injected[1], Child::Text(t) if t == "plain"));
        assert_eq!(injected[2].as_view().unwrap().value("user").unwrap()["name"], "Ann");

        // The input is untouched.
        assert_eq!(children[0].as_view().unwrap().value("user"), Some(&json!("stale")));
    }

    #[test]
    fn test_keep_existing_only_fills_gaps() {
        let children = vec![ViewDescriptor::new("Button").with_value("color", json!("blue")).into()];
        let injected = broadcast_with(
            &children,
            &params([
                ("color", Prop::Value(json!("red"))),
                ("size", Prop::Value(json!("large"))),
            ]),
            MergeStrategy::KeepExisting,
        );
        let view = injected[0].as_view().unwrap();
        assert_eq!(view.value("color"), Some(&json!("blue")));
        assert_eq!(view.value("size"), Some(&json!("large")));
    }

    #[test]
    fn test_select_returns_at_most_one_child() {
        let injected = params([("on_next", Prop::Value(Value::Bool(true)))]);
        for n in 0..5 {
            let children = views(n);
            for i in 0..n + 2 {
                let selected = select(&children, i, &injected);
                if i < n {
                    let view = selected.expect("active child");
                    assert_eq!(view.as_view().unwrap().kind(), format!("Step{i}"));
                    assert_eq!(view.as_view().unwrap().value("on_next"), Some(&Value::Bool(true)));
                } else {
                    assert!(selected.is_none());
                }
            }
        }
    }

    #[test]
    fn test_select_text_child_is_unchanged() {
        let children = vec![ViewDescriptor::new("Intro").into(), Child::text("Thanks!")];
        let selected = select(&children, 1, &params([("on_next", Prop::Value(json!(1)))])).unwrap();
        assert!(!selected.is_view());
        assert!(matches!(&selected, Child::Text(t) if t == "Thanks!"));
    }

    #[test]
    fn test_partially_apply_caller_wins() {
        let button = ViewDescriptor::new("Button").with_value("text", json!("Delete"));
        let danger = partially_apply(
            &button,
            &params([
                ("color", Prop::Value(json!("red"))),
                ("text", Prop::Value(json!("Danger"))),
            ]),
        );
        assert_eq!(danger.value("color"), Some(&json!("red")));
        assert_eq!(danger.value("text"), Some(&json!("Delete")));
        assert_eq!(danger.kind(), "Button");
    }
}
