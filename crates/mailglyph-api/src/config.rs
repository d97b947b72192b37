// this_file: crates/mailglyph-api/src/config.rs

//! Loose render configuration and process defaults.

use mailglyph_core::{MailGlyphError, Result};
use serde_json::{json, Map, Value};

/// Caller-supplied options, keyed the way they appear in JSON (`fontSize`, `outline.anchor`).
///
/// Nothing is validated until the configuration is normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderConfig {
    values: Map<String, Value>,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            _ => Err(MailGlyphError::validation("options", "must be an Object")),
        }
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    /// Set a raw top-level key.
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.set("text", text.into())
    }

    pub fn font_name_or_path(self, font: impl Into<String>) -> Self {
        self.set("fontNameOrPath", font.into())
    }

    /// Font size in pixels.
    pub fn font_size(self, pixels: f64) -> Self {
        self.set("fontSize", pixels)
    }

    /// Font size as a CSS length such as `"24px"`.
    pub fn font_size_css(self, size: impl Into<String>) -> Self {
        self.set("fontSize", size.into())
    }

    pub fn font_color(self, color: impl Into<String>) -> Self {
        self.set("fontColor", color.into())
    }

    pub fn background_color(self, color: impl Into<String>) -> Self {
        self.set("backgroundColor", color.into())
    }

    pub fn supports_fallback(self, enabled: bool) -> Self {
        self.set("supportsFallback", enabled)
    }

    pub fn resize_to_font_size(self, enabled: bool) -> Self {
        self.set("resizeToFontSize", enabled)
    }

    pub fn trim(self, enabled: bool) -> Self {
        self.set("trim", enabled)
    }

    pub fn trim_tolerance(self, percent: f64) -> Self {
        self.set("trimTolerance", percent)
    }

    /// Add one attribute to the output element.
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = Value::String(value.into());
        with_object(&mut self.values, "attrs", |attrs| {
            attrs.insert(key.to_string(), value);
        });
        self
    }

    pub fn outline_x(self, x: f64) -> Self {
        self.outline("x", x)
    }

    pub fn outline_y(self, y: f64) -> Self {
        self.outline("y", y)
    }

    /// Anchor such as `"center middle"`.
    pub fn outline_anchor(self, anchor: impl Into<String>) -> Self {
        self.outline("anchor", anchor.into())
    }

    pub fn outline_font_size(self, size: f64) -> Self {
        self.outline("fontSize", size)
    }

    pub fn outline_kerning(self, enabled: bool) -> Self {
        self.outline("kerning", enabled)
    }

    /// Attribute copied onto the glyph path, e.g. `fill` or `stroke`.
    pub fn outline_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = Value::String(value.into());
        with_object(&mut self.values, "outline", |outline| {
            with_object(outline, "attributes", |attributes| {
                attributes.insert(key.to_string(), value);
            });
        });
        self
    }

    pub fn outline_fill(self, color: impl Into<String>) -> Self {
        self.outline_attribute("fill", color)
    }

    fn outline(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        with_object(&mut self.values, "outline", |outline| {
            outline.insert(key.to_string(), value);
        });
        self
    }
}

/// Run `edit` on the object stored under `key`, replacing any non-object value.
fn with_object(map: &mut Map<String, Value>, key: &str, edit: impl FnOnce(&mut Map<String, Value>)) {
    let mut object = match map.remove(key) {
        Some(Value::Object(object)) => object,
        _ => Map::new(),
    };
    edit(&mut object);
    map.insert(key.to_string(), Value::Object(object));
}

/// Values every configuration inherits unless it sets them itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    values: Map<String, Value>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Defaults {
    pub fn builtin() -> Self {
        let builtin = json!({
            "text": "",
            "fontNameOrPath": "Arial",
            "fontSize": "24px",
            "fontColor": "#000",
            "backgroundColor": "transparent",
            "supportsFallback": true,
            "resizeToFontSize": true,
            "trim": true,
            "trimTolerance": 10,
            "attrs": {},
            "outline": {
                "x": 0,
                "y": 0,
                "anchor": "left top",
                "kerning": true,
                "attributes": { "stroke": "none" }
            }
        });
        Self {
            values: builtin.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Merge `partial` over these defaults; its values win.
    pub fn merge(&mut self, partial: &RenderConfig) {
        deep_merge(&mut self.values, partial.as_map());
    }

    /// Fresh copy of the defaults with `config` merged over them.
    pub fn apply_to(&self, config: &RenderConfig) -> Map<String, Value> {
        let mut merged = self.values.clone();
        deep_merge(&mut merged, config.as_map());
        merged
    }

    pub fn to_config(&self) -> RenderConfig {
        RenderConfig::from_map(self.values.clone())
    }
}

/// Recursively merge `overlay` into `base`; overlay wins, `null` means unset.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if value.is_null() {
            continue;
        }
        if let (Some(Value::Object(existing)), Value::Object(incoming)) = (base.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_writes_camel_case_keys() {
        let config = RenderConfig::new()
            .text("Hi")
            .font_size_css("18px")
            .attr("class", "logo")
            .outline_anchor("center middle")
            .outline_fill("#f00");
        assert_eq!(
            config.into_value(),
            json!({
                "text": "Hi",
                "fontSize": "18px",
                "attrs": { "class": "logo" },
                "outline": {
                    "anchor": "center middle",
                    "attributes": { "fill": "#f00" }
                }
            })
        );
    }

    #[test]
    fn from_json_requires_object() {
        assert!(RenderConfig::from_json(json!({"text": "a"})).is_ok());
        assert!(RenderConfig::from_json(json!("text")).is_err());
    }

    #[test]
    fn merge_is_deep_and_overlay_wins() {
        let defaults = Defaults::builtin();
        let merged = defaults.apply_to(
            &RenderConfig::new()
                .font_color("#fff")
                .outline_fill("red")
                .set("trim", Value::Null),
        );
        assert_eq!(merged["fontColor"], json!("#fff"));
        assert_eq!(merged["trim"], json!(true));
        assert_eq!(merged["resizeToFontSize"], json!(true));
        assert_eq!(
            merged["outline"]["attributes"],
            json!({ "stroke": "none", "fill": "red" })
        );
        assert_eq!(merged["outline"]["anchor"], json!("left top"));
    }

    #[test]
    fn apply_to_leaves_defaults_untouched() {
        let defaults = Defaults::builtin();
        let _ = defaults.apply_to(&RenderConfig::new().outline_fill("red"));
        assert_eq!(defaults, Defaults::builtin());
    }

    #[test]
    fn merged_defaults_take_new_values() {
        let mut defaults = Defaults::builtin();
        defaults.merge(&RenderConfig::new().font_size(12.0).attr("id", "x"));
        let config = defaults.to_config();
        assert_eq!(config.as_map()["fontSize"], json!(12.0));
        assert_eq!(config.as_map()["attrs"], json!({ "id": "x" }));
        assert_eq!(config.as_map()["fontColor"], json!("#000"));
    }
}
