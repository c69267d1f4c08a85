// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative node descriptions.
//!
//! An [`Element`] describes one desired node: its type (a string tag for
//! primitive elements or a callable for components), an optional identity
//! key, and [`Props`]. Props carry plain attributes, event handlers, and an
//! ordered list of child descriptions ([`ChildValue`]).
//!
//! Descriptions are values: the engine consumes them without interpreting
//! where they came from. Component invocation happens through
//! [`ComponentFn`], which receives the props and returns the component's
//! desired output description (or `None` for no output).
//!
//! # Event attributes
//!
//! Attribute keys that start with `on` (e.g. `onClick`) name event
//! listeners rather than plain attributes. They must be set with
//! [`PropValue::Handler`] values; the event name is the key with the
//! prefix stripped and lowercased (`onClick` → `click`).

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A shared event callback, compared by pointer identity.
#[derive(Clone)]
pub struct EventHandler(pub Rc<dyn Fn()>);

impl EventHandler {
    /// Wraps a closure as a handler.
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the handler.
    pub fn call(&self) {
        (self.0)();
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler(..)")
    }
}

/// The value of one prop attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// A string value.
    Str(String),
    /// A numeric value.
    Num(f64),
    /// A boolean value.
    Bool(bool),
    /// An event callback. Only valid for `on*` keys.
    Handler(EventHandler),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A component body: props in, desired output description out.
pub type ComponentFn = Rc<dyn Fn(&Props) -> Option<Element>>;

/// The type descriptor of an element.
#[derive(Clone)]
pub enum ElementType {
    /// A primitive element named by a string tag (`"div"`, `"span"`, ...).
    Tag(String),
    /// A plain component function.
    Function(ComponentFn),
    /// A stateful component. The engine stores a persisted-state slot for
    /// it but derives children structurally, like a primitive element; the
    /// full instantiation lifecycle is an external collaborator.
    Stateful(ComponentFn),
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "Tag({tag:?})"),
            Self::Function(_) => write!(f, "Function(..)"),
            Self::Stateful(_) => write!(f, "Stateful(..)"),
        }
    }
}

/// One entry in a children list.
///
/// `Null` and `Bool(false)` entries are skipped during mounting. Bare text
/// and numbers are wrapped as text nodes. `Bool(true)` has no node
/// interpretation and fails the build.
#[derive(Clone, Debug)]
pub enum ChildValue {
    /// A nested element description.
    Element(Element),
    /// Bare text, becomes a text node.
    Text(String),
    /// A bare number, becomes a text node with its decimal rendering.
    Num(f64),
    /// A boolean; `false` is skipped, `true` is an error.
    Bool(bool),
    /// An absent entry; skipped.
    Null,
}

impl From<Element> for ChildValue {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

impl From<&str> for ChildValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ChildValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for ChildValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

/// Attributes and children of an element description.
#[derive(Clone, Debug, Default)]
pub struct Props {
    /// Plain and event attributes, keyed by name.
    pub attrs: BTreeMap<String, PropValue>,
    /// Ordered child descriptions. May be empty.
    pub children: Vec<ChildValue>,
}

impl Props {
    /// Creates empty props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A declarative description of one desired node.
#[derive(Clone, Debug)]
pub struct Element {
    /// The element's type descriptor.
    pub ty: ElementType,
    /// Optional identity key, stable across generations.
    pub key: Option<String>,
    /// Attributes and children.
    pub props: Props,
}

impl Element {
    /// Starts a primitive element description with the given tag.
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            ty: ElementType::Tag(tag.into()),
            key: None,
            props: Props::new(),
        }
    }

    /// Starts a function-component description.
    pub fn function(body: impl Fn(&Props) -> Option<Element> + 'static) -> Self {
        Self {
            ty: ElementType::Function(Rc::new(body)),
            key: None,
            props: Props::new(),
        }
    }

    /// Starts a stateful-component description.
    pub fn stateful(body: impl Fn(&Props) -> Option<Element> + 'static) -> Self {
        Self {
            ty: ElementType::Stateful(Rc::new(body)),
            key: None,
            props: Props::new(),
        }
    }

    /// Sets the identity key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.attrs.insert(name.into(), value.into());
        self
    }

    /// Registers an event handler under the conventional `on*` key.
    ///
    /// `event` is the plain event name (`"click"`); the stored key becomes
    /// `onclick`.
    #[must_use]
    pub fn on(mut self, event: &str, handler: impl Fn() + 'static) -> Self {
        self.props.attrs.insert(
            format!("on{event}"),
            PropValue::Handler(EventHandler::new(handler)),
        );
        self
    }

    /// Appends one child description.
    #[must_use]
    pub fn child(mut self, child: impl Into<ChildValue>) -> Self {
        self.props.children.push(child.into());
        self
    }

    /// Appends several child descriptions.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = ChildValue>) -> Self {
        self.props.children.extend(children);
        self
    }
}

/// Splits an attribute key into an event name if it follows the listener
/// naming convention.
///
/// Returns `Some("click")` for `onClick`/`onclick`, `None` for keys that
/// are not listeners.
#[must_use]
pub(crate) fn event_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn builder_collects_attrs_and_children() {
        let el = Element::tag("div")
            .key("hero")
            .attr("id", "main")
            .attr("tabindex", 3.0)
            .child("Hi")
            .child(Element::tag("span"));

        assert!(matches!(&el.ty, ElementType::Tag(t) if t == "div"));
        assert_eq!(el.key.as_deref(), Some("hero"));
        assert_eq!(
            el.props.attrs.get("id"),
            Some(&PropValue::Str("main".into()))
        );
        assert_eq!(el.props.children.len(), 2);
        assert!(matches!(&el.props.children[0], ChildValue::Text(t) if t == "Hi"));
        assert!(matches!(&el.props.children[1], ChildValue::Element(_)));
    }

    #[test]
    fn on_stores_handler_under_prefixed_key() {
        let el = Element::tag("button").on("click", || {});
        assert!(matches!(
            el.props.attrs.get("onclick"),
            Some(PropValue::Handler(_))
        ));
    }

    #[test]
    fn event_name_follows_convention() {
        assert_eq!(event_name("onClick").as_deref(), Some("click"));
        assert_eq!(event_name("onclick").as_deref(), Some("click"));
        assert_eq!(event_name("id"), None);
        assert_eq!(event_name("on"), None);
    }

    #[test]
    fn handlers_compare_by_identity() {
        let a = EventHandler::new(|| {});
        let b = a.clone();
        let c = EventHandler::new(|| {});
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn handler_call_invokes_closure() {
        thread_local! {
            static HITS: Cell<u32> = const { Cell::new(0) };
        }
        let handler = EventHandler::new(|| HITS.with(|h| h.set(h.get() + 1)));
        handler.call();
        handler.call();
        assert_eq!(HITS.with(Cell::get), 2);
    }
}
