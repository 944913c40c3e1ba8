use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::semantics::aria;

/// What a part renders as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
    /// No wrapper element; only children are rendered.
    Fragment,
    Element(Cow<'static, str>),
}

impl Tag {
    pub fn element(name: impl Into<Cow<'static, str>>) -> Self {
        Tag::Element(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Tag::Fragment => None,
            Tag::Element(n) => Some(n),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

bitflags! {
    /// How a part may render while it is not visible.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Features: u8 {
        /// Honors `PassProps::unmount` (remove vs. hide).
        const RENDER_STRATEGY = 1;
        /// Honors `PassProps::is_static` (always render).
        const STATIC = 1 << 1;
    }

    /// Events a binding has to forward to the component.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Listeners: u8 {
        const CLICK = 1;
        const KEY_DOWN = 1 << 1;
        const FOCUS = 1 << 3;
        const POINTER_MOVE = 1 << 4;
        const POINTER_LEAVE = 1 << 5;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RenderStrategy {
    /// Remove the element while hidden.
    #[default]
    Unmount,
    /// Keep the element, styled `display: none`.
    Hidden,
}

impl RenderStrategy {
    pub fn from_unmount(unmount: bool) -> Self {
        if unmount {
            RenderStrategy::Unmount
        } else {
            RenderStrategy::Hidden
        }
    }
}

/// Class name, either fixed or computed from the part's slot
/// (e.g. `{ active, disabled }` for menu items).
pub enum ClassName<S> {
    Static(String),
    Dynamic(Rc<dyn Fn(&S) -> String>),
}

impl<S> ClassName<S> {
    pub fn dynamic(f: impl Fn(&S) -> String + 'static) -> Self {
        ClassName::Dynamic(Rc::new(f))
    }

    pub fn resolve(&self, slot: &S) -> String {
        match self {
            ClassName::Static(s) => s.clone(),
            ClassName::Dynamic(f) => f(slot),
        }
    }
}

impl<S> Clone for ClassName<S> {
    fn clone(&self) -> Self {
        match self {
            ClassName::Static(s) => ClassName::Static(s.clone()),
            ClassName::Dynamic(f) => ClassName::Dynamic(f.clone()),
        }
    }
}

impl<S> fmt::Debug for ClassName<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassName::Static(s) => f.debug_tuple("Static").field(s).finish(),
            ClassName::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<S> From<&str> for ClassName<S> {
    fn from(s: &str) -> Self {
        ClassName::Static(s.to_string())
    }
}

/// Props a caller passes through to a part. Anything the component controls
/// (ids, ARIA attributes) overrides these.
pub struct PassProps<S> {
    pub as_tag: Option<Tag>,
    pub class: Option<ClassName<S>>,
    pub attrs: BTreeMap<Cow<'static, str>, AttrValue>,
    pub is_static: bool,
    pub unmount: bool,
}

impl<S> Default for PassProps<S> {
    fn default() -> Self {
        Self {
            as_tag: None,
            class: None,
            attrs: BTreeMap::new(),
            is_static: false,
            unmount: true,
        }
    }
}

impl<S> Clone for PassProps<S> {
    fn clone(&self) -> Self {
        Self {
            as_tag: self.as_tag.clone(),
            class: self.class.clone(),
            attrs: self.attrs.clone(),
            is_static: self.is_static,
            unmount: self.unmount,
        }
    }
}

impl<S> fmt::Debug for PassProps<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassProps")
            .field("as_tag", &self.as_tag)
            .field("class", &self.class)
            .field("attrs", &self.attrs)
            .field("is_static", &self.is_static)
            .field("unmount", &self.unmount)
            .finish()
    }
}

impl<S> PassProps<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_tag(mut self, tag: Tag) -> Self {
        self.as_tag = Some(tag);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(ClassName::Static(class.into()));
        self
    }

    pub fn class_fn(mut self, f: impl Fn(&S) -> String + 'static) -> Self {
        self.class = Some(ClassName::dynamic(f));
        self
    }

    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn unmount(mut self, unmount: bool) -> Self {
        self.unmount = unmount;
        self
    }

    pub fn strategy(&self) -> RenderStrategy {
        RenderStrategy::from_unmount(self.unmount)
    }
}

/// Fully resolved props handed to a `Renderable`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Props {
    pub tag: Tag,
    pub id: Option<String>,
    pub class: Option<String>,
    pub attrs: BTreeMap<Cow<'static, str>, AttrValue>,
    pub listeners: Listeners,
    pub hidden: bool,
}

impl Props {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            class: None,
            attrs: BTreeMap::new(),
            listeners: Listeners::empty(),
            hidden: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() {
            self.class = Some(class);
        }
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(Cow::Borrowed(name), value.into());
        self
    }

    /// Set `name` only when `value` is present.
    pub fn attr_opt<V: Into<AttrValue>>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    pub fn listen(mut self, listeners: Listeners) -> Self {
        self.listeners |= listeners;
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Merge caller props underneath ours.
    pub fn merged_with<S>(self, pass: &PassProps<S>, slot: &S) -> Props {
        let mut attrs = pass.attrs.clone();
        attrs.extend(self.attrs);

        let class = match (pass.class.as_ref().map(|c| c.resolve(slot)), self.class) {
            (Some(theirs), Some(ours)) => Some(join_classes(&theirs, &ours)),
            (Some(theirs), None) => Some(theirs),
            (None, ours) => ours,
        }
        .filter(|c| !c.is_empty());

        Props {
            tag: pass.as_tag.clone().unwrap_or(self.tag),
            id: self.id,
            class,
            attrs,
            listeners: self.listeners,
            hidden: self.hidden,
        }
    }

    fn into_hidden(mut self) -> Self {
        self.hidden = true;
        self.attrs
            .insert(Cow::Borrowed(aria::STYLE), "display: none;".into());
        self
    }
}

fn join_classes(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}

/// Outcome of the render features for a part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    /// Rendered with `hidden` and `display: none`.
    Hidden,
    Omitted,
}

pub fn visibility(features: Features, is_static: bool, unmount: bool, visible: bool) -> Visibility {
    if visible {
        return Visibility::Shown;
    }
    if features.contains(Features::STATIC) && is_static {
        return Visibility::Shown;
    }
    if features.contains(Features::RENDER_STRATEGY) {
        return match RenderStrategy::from_unmount(unmount) {
            RenderStrategy::Unmount => Visibility::Omitted,
            RenderStrategy::Hidden => Visibility::Hidden,
        };
    }
    Visibility::Shown
}

/// The rendering capability a host binding implements.
pub trait Renderable {
    type Output;

    fn element(&mut self, props: &Props) -> Self::Output;

    /// The part renders nothing (unmounted).
    fn omitted(&mut self) -> Self::Output;
}

/// Merge `ours` over `pass`, apply the render features, and hand the result
/// to `renderer`.
pub fn render<R: Renderable, S>(
    renderer: &mut R,
    ours: Props,
    pass: &PassProps<S>,
    slot: &S,
    features: Features,
    visible: bool,
) -> R::Output {
    match visibility(features, pass.is_static, pass.unmount, visible) {
        Visibility::Shown => renderer.element(&ours.merged_with(pass, slot)),
        Visibility::Hidden => renderer.element(&ours.merged_with(pass, slot).into_hidden()),
        Visibility::Omitted => renderer.omitted(),
    }
}

/// Reference renderer: prints the HTML start tag of each element.
///
/// Fragments print as `<>`; omitted parts yield `None`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Markup;

impl Renderable for Markup {
    type Output = Option<String>;

    fn element(&mut self, props: &Props) -> Option<String> {
        let Some(name) = props.tag.name() else {
            return Some("<>".to_string());
        };

        let mut out = format!("<{name}");
        if let Some(id) = &props.id {
            out.push_str(&format!(" id=\"{}\"", escape(id)));
        }
        if let Some(class) = &props.class {
            out.push_str(&format!(" class=\"{}\"", escape(class)));
        }
        for (k, v) in &props.attrs {
            out.push_str(&format!(" {k}=\"{}\"", escape(&v.to_string())));
        }
        if props.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
        Some(out)
    }

    fn omitted(&mut self) -> Option<String> {
        None
    }
}

fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '"', '<', '>']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}
