//! Partial settings updates
//!
//! A patch carries raw JSON values keyed by field name. This is the one place
//! where an out-of-range value can exist; `apply_to` validates every entry
//! before anything is merged.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::settings::{
    ColorMode, Configuration, ContentWidth, Contrast, Direction, Field, Locale, NavColor,
    NavigationMenuType, SideNavState, Skin,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    entries: Vec<(String, Value)>,
}

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value. A later entry for the same key wins.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn navigation_menu_type(self, value: NavigationMenuType) -> Self {
        self.set(Field::NavigationMenuType.key(), value.as_str())
    }

    pub fn side_nav_state(self, value: SideNavState) -> Self {
        self.set(Field::SideNavState.key(), value.as_str())
    }

    pub fn nav_color(self, value: NavColor) -> Self {
        self.set(Field::NavColor.key(), value.as_str())
    }

    pub fn color_mode(self, value: ColorMode) -> Self {
        self.set(Field::ColorMode.key(), value.as_str())
    }

    pub fn contrast(self, value: Contrast) -> Self {
        self.set(Field::Contrast.key(), value.as_str())
    }

    pub fn direction(self, value: Direction) -> Self {
        self.set(Field::Direction.key(), value.as_str())
    }

    pub fn locale(self, value: Locale) -> Self {
        self.set(Field::Locale.key(), value.as_str())
    }

    pub fn skin(self, value: Skin) -> Self {
        self.set(Field::Skin.key(), value.as_str())
    }

    pub fn content_width(self, value: ContentWidth) -> Self {
        self.set(Field::ContentWidth.key(), value.as_str())
    }

    /// Build a patch from `(key, value)` string pairs, e.g. parsed `key=value`
    /// arguments. Values are taken verbatim as JSON strings.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |patch, (key, value)| {
                let value: String = value.into();
                patch.set(key, value)
            })
    }

    /// Build a patch from a JSON object. Entries come out sorted by key, which
    /// is harmless since an object cannot repeat a key.
    pub fn from_object(object: Map<String, Value>) -> Self {
        Self { entries: object.into_iter().collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Validate every entry and merge into a copy of `base`.
    ///
    /// Returns the merged record with `base`'s version untouched; the caller
    /// owns version bookkeeping. Nothing is returned unless every entry is valid.
    pub fn apply_to(&self, base: &Configuration) -> Result<Configuration, ConfigError> {
        let mut next = base.clone();
        for (key, value) in &self.entries {
            let field = Field::from_key(key).ok_or_else(|| ConfigError::UnknownField(key.clone()))?;
            match field {
                Field::NavigationMenuType => next.navigation_menu_type = parse(field, value)?,
                Field::SideNavState => next.side_nav_state = parse(field, value)?,
                Field::NavColor => next.nav_color = parse(field, value)?,
                Field::ColorMode => next.color_mode = parse(field, value)?,
                Field::Contrast => next.contrast = parse(field, value)?,
                Field::Direction => next.direction = parse(field, value)?,
                Field::Locale => next.locale = parse(field, value)?,
                Field::Skin => next.skin = parse(field, value)?,
                Field::ContentWidth => next.content_width = parse(field, value)?,
            }
        }
        Ok(next)
    }
}

fn parse<T: DeserializeOwned>(field: Field, value: &Value) -> Result<T, ConfigError> {
    serde_json::from_value(value.clone()).map_err(|_| ConfigError::InvalidConfigValue {
        field: field.key().to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_setters_merge_into_base() {
        let base = Configuration { version: 4, ..Configuration::default() };
        let patch = ConfigPatch::new()
            .color_mode(ColorMode::Dark)
            .direction(Direction::Rtl);

        let merged = patch.apply_to(&base).unwrap();
        assert_eq!(merged.color_mode, ColorMode::Dark);
        assert_eq!(merged.direction, Direction::Rtl);
        assert_eq!(merged.locale, base.locale);
        assert_eq!(merged.version, 4);
    }

    #[test]
    fn test_invalid_member_rejected_with_field_name() {
        let patch = ConfigPatch::new().set("navColor", "neon");
        let err = patch.apply_to(&Configuration::default()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidConfigValue {
                field: "navColor".to_string(),
                value: "\"neon\"".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_json_type_rejected() {
        let patch = ConfigPatch::new().set("colorMode", json!(1));
        assert!(matches!(
            patch.apply_to(&Configuration::default()),
            Err(ConfigError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_unknown_and_version_keys_rejected() {
        let unknown = ConfigPatch::new().set("fontSize", "large");
        assert_eq!(
            unknown.apply_to(&Configuration::default()).unwrap_err(),
            ConfigError::UnknownField("fontSize".to_string())
        );

        let version = ConfigPatch::new().set("version", json!(99));
        assert!(matches!(
            version.apply_to(&Configuration::default()),
            Err(ConfigError::UnknownField(_))
        ));
    }

    #[test]
    fn test_later_entry_for_same_key_wins() {
        let patch = ConfigPatch::new()
            .color_mode(ColorMode::Dark)
            .color_mode(ColorMode::Light);
        let merged = patch.apply_to(&Configuration::default()).unwrap();
        assert_eq!(merged.color_mode, ColorMode::Light);
    }

    #[test]
    fn test_from_pairs_and_object() {
        let pairs = ConfigPatch::from_pairs([("sideNavState", "collapsed"), ("locale", "fr")]);
        assert_eq!(pairs.len(), 2);
        let merged = pairs.apply_to(&Configuration::default()).unwrap();
        assert_eq!(merged.side_nav_state, SideNavState::Collapsed);
        assert_eq!(merged.locale, Locale::Fr);

        let Value::Object(object) = json!({ "skin": "bordered", "contentWidth": "wide" }) else {
            unreachable!()
        };
        let merged = ConfigPatch::from_object(object)
            .apply_to(&Configuration::default())
            .unwrap();
        assert_eq!(merged.skin, Skin::Bordered);
        assert_eq!(merged.content_width, ContentWidth::Wide);
    }

    #[test]
    fn test_from_object_entries_sorted_by_key() {
        let object = match json!({"skin": "bordered", "colorMode": "dark", "locale": "ar"}) {
            Value::Object(object) => object,
            _ => unreachable!(),
        };
        let patch = ConfigPatch::from_object(object);
        let keys: Vec<&str> = patch.entries.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["colorMode", "locale", "skin"]);
    }
}
