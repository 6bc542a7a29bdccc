//! Named, typed, user-editable node settings.
//!
//! Every node and action exposes its configurable fields as an
//! [`AttributeSet`]. Each [`Attribute`] carries a stable snake_case id, a
//! display name, a default, optional numeric bounds, a visibility flag and,
//! for choice attributes, the list of option labels.
//!
//! Writes go through [`AttributeSet::set`], which coerces compatible values
//! (integers into float fields, hex strings into color fields, labels into
//! choice fields), clamps numbers into bounds and reports whether the
//! stored value actually changed. Nodes use that flag to skip redundant
//! resets.
//!
//! Typed reads never fail: a missing id or a mismatched type yields the
//! zero value of the requested type.
//!
//! ```rust
//! use neuro_core::{Attribute, AttributeSet, AttributeValue};
//!
//! let mut attrs = AttributeSet::new();
//! attrs.add(Attribute::float("speed", "Speed", 0.75, 0.0, 1.0));
//!
//! assert_eq!(attrs.set("speed", AttributeValue::Float(3.0)), Ok(true));
//! assert_eq!(attrs.float("speed"), 1.0);
//! assert_eq!(attrs.set("speed", AttributeValue::Int(1)), Ok(false));
//! ```

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::color::Color;
use crate::math::clamp;

/// A stored attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Floating point number.
    Float(f64),
    /// Signed integer.
    Int(i32),
    /// Flag.
    Bool(bool),
    /// Free text.
    Text(String),
    /// RGBA color.
    Color(Color),
    /// Index into the attribute's option list.
    Choice(usize),
}

impl AttributeValue {
    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Color(_) => "color",
            Self::Choice(_) => "choice",
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for AttributeValue {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

impl_from!(f64 => Float, i32 => Int, bool => Bool, String => Text, Color => Color);

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

/// Errors from attribute writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// No attribute with this id.
    UnknownAttribute(String),
    /// The value cannot be stored in this attribute.
    TypeMismatch {
        /// Attribute id.
        id: String,
        /// Type the attribute holds.
        expected: &'static str,
        /// Type that was supplied.
        found: &'static str,
    },
    /// The choice label or index does not exist.
    InvalidChoice {
        /// Attribute id.
        id: String,
        /// Rejected label or index.
        value: String,
    },
}

#[cfg(feature = "std")]
impl std::fmt::Display for AttributeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownAttribute(id) => write!(f, "unknown attribute '{id}'"),
            Self::TypeMismatch {
                id,
                expected,
                found,
            } => write!(f, "attribute '{id}' expects {expected}, got {found}"),
            Self::InvalidChoice { id, value } => {
                write!(f, "attribute '{id}' has no option '{value}'")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AttributeError {}

/// One attribute: metadata plus current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Stable identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Current value.
    pub value: AttributeValue,
    /// Value restored by [`AttributeSet::reset_to_defaults`].
    pub default: AttributeValue,
    /// Lower bound for numeric values.
    pub min: Option<f64>,
    /// Upper bound for numeric values.
    pub max: Option<f64>,
    /// Whether the attribute should be shown to the user.
    pub visible: bool,
    /// Option labels of a choice attribute.
    pub choices: &'static [&'static str],
}

impl Attribute {
    fn with(id: &'static str, name: &'static str, value: AttributeValue) -> Self {
        Self {
            id,
            name,
            default: value.clone(),
            value,
            min: None,
            max: None,
            visible: true,
            choices: &[],
        }
    }

    /// Bounded float attribute.
    pub fn float(id: &'static str, name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::with(id, name, AttributeValue::Float(clamp(default, min, max)))
        }
    }

    /// Bounded integer attribute.
    pub fn int(id: &'static str, name: &'static str, default: i32, min: i32, max: i32) -> Self {
        Self {
            min: Some(f64::from(min)),
            max: Some(f64::from(max)),
            ..Self::with(id, name, AttributeValue::Int(clamp(default, min, max)))
        }
    }

    /// Boolean attribute.
    pub fn boolean(id: &'static str, name: &'static str, default: bool) -> Self {
        Self::with(id, name, AttributeValue::Bool(default))
    }

    /// Text attribute.
    pub fn text(id: &'static str, name: &'static str, default: &str) -> Self {
        Self::with(id, name, AttributeValue::Text(String::from(default)))
    }

    /// Color attribute.
    pub fn color(id: &'static str, name: &'static str, default: Color) -> Self {
        Self::with(id, name, AttributeValue::Color(default))
    }

    /// Choice attribute over `choices`. `default` is clamped to a valid index.
    pub fn choice(
        id: &'static str,
        name: &'static str,
        choices: &'static [&'static str],
        default: usize,
    ) -> Self {
        let default = default.min(choices.len().saturating_sub(1));
        Self {
            choices,
            ..Self::with(id, name, AttributeValue::Choice(default))
        }
    }

    /// Starts hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Label of the selected option of a choice attribute.
    pub fn choice_label(&self) -> Option<&'static str> {
        match self.value {
            AttributeValue::Choice(i) => self.choices.get(i).copied(),
            _ => None,
        }
    }

    fn bound(&self, value: f64) -> f64 {
        let lo = self.min.unwrap_or(f64::MIN);
        let hi = self.max.unwrap_or(f64::MAX);
        clamp(value, lo, hi)
    }

    fn coerce(&self, value: AttributeValue) -> Result<AttributeValue, AttributeError> {
        let mismatch = |found: &AttributeValue| AttributeError::TypeMismatch {
            id: String::from(self.id),
            expected: self.value.type_name(),
            found: found.type_name(),
        };

        match (&self.value, value) {
            (AttributeValue::Float(_), AttributeValue::Float(v)) => {
                Ok(AttributeValue::Float(self.bound(v)))
            }
            (AttributeValue::Float(_), AttributeValue::Int(v)) => {
                Ok(AttributeValue::Float(self.bound(f64::from(v))))
            }
            (AttributeValue::Int(_), AttributeValue::Int(v)) => {
                Ok(AttributeValue::Int(self.bound(f64::from(v)) as i32))
            }
            (AttributeValue::Bool(_), v @ AttributeValue::Bool(_))
            | (AttributeValue::Text(_), v @ AttributeValue::Text(_))
            | (AttributeValue::Color(_), v @ AttributeValue::Color(_)) => Ok(v),
            (AttributeValue::Color(_), AttributeValue::Text(hex)) => Color::parse_hex(&hex)
                .map(AttributeValue::Color)
                .ok_or_else(|| mismatch(&AttributeValue::Text(hex))),
            (AttributeValue::Choice(_), AttributeValue::Choice(i)) => self.choice_index(i),
            (AttributeValue::Choice(_), AttributeValue::Int(i)) => match usize::try_from(i) {
                Ok(i) => self.choice_index(i),
                Err(_) => Err(self.invalid_choice(i)),
            },
            (AttributeValue::Choice(_), AttributeValue::Text(label)) => self
                .choices
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&label))
                .map(AttributeValue::Choice)
                .ok_or_else(|| self.invalid_choice(label)),
            (_, other) => Err(mismatch(&other)),
        }
    }

    fn choice_index(&self, index: usize) -> Result<AttributeValue, AttributeError> {
        if index < self.choices.len() {
            Ok(AttributeValue::Choice(index))
        } else {
            Err(self.invalid_choice(index))
        }
    }

    fn invalid_choice(&self, value: impl core::fmt::Display) -> AttributeError {
        use core::fmt::Write;
        let mut text = String::new();
        let _ = write!(text, "{value}");
        AttributeError::InvalidChoice {
            id: String::from(self.id),
            value: text,
        }
    }
}

/// Ordered collection of attributes, looked up by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute, replacing one with the same id.
    pub fn add(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.id == attribute.id) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.add(attribute);
        self
    }

    /// Looks an attribute up by id.
    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|a| a.id == id)
    }

    /// Whether an attribute with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Stores `value`, returning whether the stored value changed.
    pub fn set(&mut self, id: &str, value: AttributeValue) -> Result<bool, AttributeError> {
        let attribute = self
            .get_mut(id)
            .ok_or_else(|| AttributeError::UnknownAttribute(String::from(id)))?;
        let value = attribute.coerce(value)?;
        if attribute.value == value {
            return Ok(false);
        }
        attribute.value = value;
        Ok(true)
    }

    /// Restores every default.
    pub fn reset_to_defaults(&mut self) {
        for attribute in &mut self.attributes {
            attribute.value = attribute.default.clone();
        }
    }

    /// Shows or hides an attribute. Returns whether visibility changed.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(a) if a.visible != visible => {
                a.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Whether the attribute is visible. Missing ids are invisible.
    pub fn is_visible(&self, id: &str) -> bool {
        self.get(id).is_some_and(|a| a.visible)
    }

    /// Float value; integers widen.
    pub fn float(&self, id: &str) -> f64 {
        match self.get(id).map(|a| &a.value) {
            Some(AttributeValue::Float(v)) => *v,
            Some(AttributeValue::Int(v)) => f64::from(*v),
            _ => 0.0,
        }
    }

    /// Integer value.
    pub fn int(&self, id: &str) -> i32 {
        match self.get(id).map(|a| &a.value) {
            Some(AttributeValue::Int(v)) => *v,
            _ => 0,
        }
    }

    /// Boolean value.
    pub fn boolean(&self, id: &str) -> bool {
        matches!(self.get(id).map(|a| &a.value), Some(AttributeValue::Bool(true)))
    }

    /// Text value.
    pub fn text(&self, id: &str) -> &str {
        match self.get(id).map(|a| &a.value) {
            Some(AttributeValue::Text(v)) => v,
            _ => "",
        }
    }

    /// Color value.
    pub fn color(&self, id: &str) -> Color {
        match self.get(id).map(|a| &a.value) {
            Some(AttributeValue::Color(v)) => *v,
            _ => Color::default(),
        }
    }

    /// Selected option index.
    pub fn choice(&self, id: &str) -> usize {
        match self.get(id).map(|a| &a.value) {
            Some(AttributeValue::Choice(v)) => *v,
            _ => 0,
        }
    }
}
