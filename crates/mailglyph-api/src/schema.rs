// this_file: crates/mailglyph-api/src/schema.rs

//! Field table for render options: where each field lives, what type it
//! must have and the constraint reported when it does not.

use mailglyph_core::utils::{parse_leading_number, round_half_up};
use mailglyph_core::{MailGlyphError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any string, blank allowed
    Text,
    /// A string with at least one non-whitespace character
    NonBlankText,
    /// A number, or a string whose leading number is used; rounded, > 0
    PixelSize,
    Flag,
    /// A number between 1 and 99 inclusive
    Percent,
    Number,
    PositiveNumber,
    /// Object whose values are strings, numbers or booleans
    Attributes,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name reported in validation errors
    pub name: &'static str,
    /// Key path inside the merged options
    pub path: &'static [&'static str],
    pub kind: FieldKind,
    pub constraint: &'static str,
}

pub const TEXT: FieldSpec = FieldSpec {
    name: "text",
    path: &["text"],
    kind: FieldKind::Text,
    constraint: "must be a String",
};
pub const FONT_NAME_OR_PATH: FieldSpec = FieldSpec {
    name: "fontNameOrPath",
    path: &["fontNameOrPath"],
    kind: FieldKind::NonBlankText,
    constraint: "must be a String and not blank",
};
pub const FONT_SIZE: FieldSpec = FieldSpec {
    name: "fontSize",
    path: &["fontSize"],
    kind: FieldKind::PixelSize,
    constraint: "must be a Number or String that is a valid number > than 0",
};
pub const FONT_COLOR: FieldSpec = FieldSpec {
    name: "fontColor",
    path: &["fontColor"],
    kind: FieldKind::NonBlankText,
    constraint: "must be a String and not blank",
};
pub const BACKGROUND_COLOR: FieldSpec = FieldSpec {
    name: "backgroundColor",
    path: &["backgroundColor"],
    kind: FieldKind::NonBlankText,
    constraint: "must be a String and not blank",
};
pub const SUPPORTS_FALLBACK: FieldSpec = FieldSpec {
    name: "supportsFallback",
    path: &["supportsFallback"],
    kind: FieldKind::Flag,
    constraint: "must be a Boolean",
};
pub const RESIZE_TO_FONT_SIZE: FieldSpec = FieldSpec {
    name: "resizeToFontSize",
    path: &["resizeToFontSize"],
    kind: FieldKind::Flag,
    constraint: "must be a Boolean",
};
pub const TRIM: FieldSpec = FieldSpec {
    name: "trim",
    path: &["trim"],
    kind: FieldKind::Flag,
    constraint: "must be a Boolean",
};
pub const TRIM_TOLERANCE: FieldSpec = FieldSpec {
    name: "trimTolerance",
    path: &["trimTolerance"],
    kind: FieldKind::Percent,
    constraint: "must be a Number between 1 and 99 inclusive",
};
pub const ATTRS: FieldSpec = FieldSpec {
    name: "attrs",
    path: &["attrs"],
    kind: FieldKind::Attributes,
    constraint: "must be an Object of String, Number or Boolean values keyed by attribute names",
};
pub const OUTLINE: FieldSpec = FieldSpec {
    name: "outline",
    path: &["outline"],
    kind: FieldKind::Object,
    constraint: "must be an Object",
};
pub const OUTLINE_X: FieldSpec = FieldSpec {
    name: "outline.x",
    path: &["outline", "x"],
    kind: FieldKind::Number,
    constraint: "must be a Number",
};
pub const OUTLINE_Y: FieldSpec = FieldSpec {
    name: "outline.y",
    path: &["outline", "y"],
    kind: FieldKind::Number,
    constraint: "must be a Number",
};
pub const OUTLINE_ANCHOR: FieldSpec = FieldSpec {
    name: "outline.anchor",
    path: &["outline", "anchor"],
    kind: FieldKind::Text,
    constraint: "must be a String",
};
pub const OUTLINE_FONT_SIZE: FieldSpec = FieldSpec {
    name: "outline.fontSize",
    path: &["outline", "fontSize"],
    kind: FieldKind::PositiveNumber,
    constraint: "must be a Number > than 0",
};
pub const OUTLINE_KERNING: FieldSpec = FieldSpec {
    name: "outline.kerning",
    path: &["outline", "kerning"],
    kind: FieldKind::Flag,
    constraint: "must be a Boolean",
};
pub const OUTLINE_ATTRIBUTES: FieldSpec = FieldSpec {
    name: "outline.attributes",
    path: &["outline", "attributes"],
    kind: FieldKind::Attributes,
    constraint: "must be an Object of String, Number or Boolean values keyed by attribute names",
};

/// Every field, in validation order.
pub const SCHEMA: &[FieldSpec] = &[
    TEXT,
    FONT_NAME_OR_PATH,
    FONT_SIZE,
    FONT_COLOR,
    BACKGROUND_COLOR,
    SUPPORTS_FALLBACK,
    RESIZE_TO_FONT_SIZE,
    TRIM,
    TRIM_TOLERANCE,
    ATTRS,
    OUTLINE,
    OUTLINE_X,
    OUTLINE_Y,
    OUTLINE_ANCHOR,
    OUTLINE_FONT_SIZE,
    OUTLINE_KERNING,
    OUTLINE_ATTRIBUTES,
];

/// Check every field in [`SCHEMA`] against `options`.
pub fn validate(options: &Map<String, Value>) -> Result<()> {
    SCHEMA.iter().try_for_each(|spec| spec.check(options))
}

impl FieldSpec {
    /// Value at this field's path; `null` counts as absent.
    pub fn lookup<'m>(&self, options: &'m Map<String, Value>) -> Option<&'m Value> {
        let (last, parents) = self.path.split_last()?;
        let mut map = options;
        for key in parents {
            map = map.get(*key)?.as_object()?;
        }
        map.get(*last).filter(|value| !value.is_null())
    }

    pub fn reject(&self) -> MailGlyphError {
        MailGlyphError::validation(self.name, self.constraint)
    }

    /// Validate according to [`FieldKind`]. Optional kinds accept absence.
    pub fn check(&self, options: &Map<String, Value>) -> Result<()> {
        match self.kind {
            FieldKind::Text | FieldKind::NonBlankText => self.text(options).map(drop),
            FieldKind::PixelSize => self.pixel_size(options).map(drop),
            FieldKind::Flag => self.flag(options).map(drop),
            FieldKind::Percent => self.percent(options).map(drop),
            FieldKind::Number | FieldKind::PositiveNumber => self.number(options).map(drop),
            FieldKind::Attributes => self.attributes(options).map(drop),
            FieldKind::Object => match self.lookup(options) {
                None | Some(Value::Object(_)) => Ok(()),
                Some(_) => Err(self.reject()),
            },
        }
    }

    pub fn text(&self, options: &Map<String, Value>) -> Result<String> {
        match self.lookup(options) {
            Some(Value::String(text))
                if self.kind != FieldKind::NonBlankText || !text.trim().is_empty() =>
            {
                Ok(text.clone())
            }
            _ => Err(self.reject()),
        }
    }

    pub fn flag(&self, options: &Map<String, Value>) -> Result<bool> {
        self.lookup(options)
            .and_then(Value::as_bool)
            .ok_or_else(|| self.reject())
    }

    /// Whole pixels; strings keep their leading number (`"24px"`), then round half up.
    pub fn pixel_size(&self, options: &Map<String, Value>) -> Result<u32> {
        let raw = match self.lookup(options) {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) => parse_leading_number(text),
            _ => None,
        };
        raw.map(round_half_up)
            .filter(|size| size.is_finite() && *size > 0.0 && *size <= f64::from(u32::MAX))
            .map(|size| size as u32)
            .ok_or_else(|| self.reject())
    }

    /// Percentage in `1..=99`, rounded to a whole percent.
    pub fn percent(&self, options: &Map<String, Value>) -> Result<u8> {
        self.lookup(options)
            .and_then(Value::as_f64)
            .filter(|value| (1.0..=99.0).contains(value))
            .map(|value| round_half_up(value) as u8)
            .ok_or_else(|| self.reject())
    }

    /// `None` when unset.
    pub fn number(&self, options: &Map<String, Value>) -> Result<Option<f64>> {
        let Some(value) = self.lookup(options) else {
            return Ok(None);
        };
        value
            .as_f64()
            .filter(|number| {
                number.is_finite() && (self.kind != FieldKind::PositiveNumber || *number > 0.0)
            })
            .map(Some)
            .ok_or_else(|| self.reject())
    }

    /// Attribute map with scalar values stringified; empty when unset.
    pub fn attributes(&self, options: &Map<String, Value>) -> Result<BTreeMap<String, String>> {
        let Some(value) = self.lookup(options) else {
            return Ok(BTreeMap::new());
        };
        let object = value.as_object().ok_or_else(|| self.reject())?;

        let mut attributes = BTreeMap::new();
        for (key, value) in object {
            if !is_xml_name(key) {
                return Err(self.reject());
            }
            let value = match value {
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => continue,
                _ => return Err(self.reject()),
            };
            attributes.insert(key.clone(), value);
        }
        Ok(attributes)
    }
}

/// XML `Name`: a letter, `_` or `:` first, then letters, digits, `-`, `.`, `_` or `:`.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
}
