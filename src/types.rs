//! Core types - head elements, resource handles, entry ids.
//!
//! A [`HeadNode`] is the opaque resource the registry arbitrates. It wraps an
//! immutable [`HeadElement`] behind an `Rc`, and two handles are only equal
//! when they point at the same allocation. Rebuilding an identical element
//! produces a *different* resource, which is exactly what the render sink
//! needs to tell "same winner" apart from "new winner with equal content".

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Entry Id
// =============================================================================

/// Unique token identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    /// Raw numeric value (diagnostics only).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// =============================================================================
// Head Elements
// =============================================================================

/// Group key shared by every title contribution.
pub const TITLE_GROUP: &str = "title";

/// Default script type used for inline scripts without an explicit type.
pub const DEFAULT_SCRIPT_TYPE: &str = "text/javascript";

/// Attributes of a meta tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaProps {
    /// `charset` attribute.
    pub charset: Option<String>,
    /// `http-equiv` attribute.
    pub http_equiv: Option<String>,
    /// `name` attribute.
    pub name: Option<String>,
    /// `property` attribute (Open Graph and friends).
    pub property: Option<String>,
    /// `content` attribute.
    pub content: Option<String>,
}

impl MetaProps {
    /// Shorthand for `<meta name=".." content="..">`.
    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Shorthand for `<meta property=".." content="..">`.
    pub fn property(property: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            property: Some(property.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Deduplication key for this meta tag.
    ///
    /// Discriminators are checked in order: charset, http-equiv, name,
    /// property. Returns `None` when the tag has none of them, in which case
    /// it can't be deduplicated.
    pub fn group_key(&self) -> Option<String> {
        if self.charset.is_some() {
            return Some("meta:charset".to_string());
        }
        if let Some(v) = &self.http_equiv {
            return Some(format!("meta:http-equiv:{}", v.to_ascii_lowercase()));
        }
        if let Some(v) = &self.name {
            return Some(format!("meta:name:{v}"));
        }
        self.property.as_ref().map(|v| format!("meta:property:{v}"))
    }
}

/// Attributes of a script tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptProps {
    /// External script URL.
    pub src: Option<String>,
    /// `type` attribute.
    pub script_type: Option<String>,
    /// Inline body.
    pub content: Option<String>,
}

impl ScriptProps {
    /// External script loaded from `src`.
    pub fn external(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Default::default()
        }
    }

    /// Inline script with the given type.
    pub fn inline(script_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            script_type: Some(script_type.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Deduplication key: the URL for external scripts, the content type
    /// for inline ones.
    pub fn group_key(&self) -> String {
        match &self.src {
            Some(src) => format!("script:src:{src}"),
            None => format!(
                "script:type:{}",
                self.script_type.as_deref().unwrap_or(DEFAULT_SCRIPT_TYPE)
            ),
        }
    }
}

/// A document-head element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadElement {
    /// Document title.
    Title(String),
    /// Meta tag.
    Meta(MetaProps),
    /// Script tag.
    Script(ScriptProps),
}

impl HeadElement {
    /// Title text, if this is a title.
    pub fn as_title(&self) -> Option<&str> {
        match self {
            Self::Title(text) => Some(text),
            _ => None,
        }
    }
}

// =============================================================================
// Head Node - the opaque resource handle
// =============================================================================

/// Shared handle to a head element. Equality is identity.
#[derive(Clone)]
pub struct HeadNode(Rc<HeadElement>);

impl HeadNode {
    /// Wrap an element in a fresh handle.
    pub fn new(element: HeadElement) -> Self {
        Self(Rc::new(element))
    }

    /// Title node.
    pub fn title(text: impl Into<String>) -> Self {
        Self::new(HeadElement::Title(text.into()))
    }

    /// Meta node.
    pub fn meta(props: MetaProps) -> Self {
        Self::new(HeadElement::Meta(props))
    }

    /// Script node.
    pub fn script(props: ScriptProps) -> Self {
        Self::new(HeadElement::Script(props))
    }

    /// Borrow the element.
    pub fn element(&self) -> &HeadElement {
        &self.0
    }
}

impl PartialEq for HeadNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HeadNode {}

impl fmt::Debug for HeadNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeadNode").field(&*self.0).finish()
    }
}

impl From<HeadElement> for HeadNode {
    fn from(element: HeadElement) -> Self {
        Self::new(element)
    }
}

// =============================================================================
// Tests
// =============================================================================
