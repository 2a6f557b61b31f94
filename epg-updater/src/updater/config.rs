//! Reconciliation parameters, frozen once per import session.

use epg_protocol::MediaType;
use log::debug;

use crate::database::Result;
use crate::store::SettingsSource;

/// Setting names understood by the updater.
pub mod keys {
    pub const TITLE_TEMPLATE: &str = "epgTitleTemplate";
    pub const DESCRIPTION_TEMPLATE: &str = "epgDescriptionTemplate";
    pub const LANGUAGES: &str = "epgLanguages";
    pub const STORE_ONLY_SELECTED: &str = "epgStoreOnlySelected";
    pub const RADIO_STORE_ONLY_SELECTED: &str = "epgRadioStoreOnlySelected";
    pub const REGRAB_AFTER: &str = "timeoutEPGRefresh";
    pub const ALWAYS_FILL_HOLES: &str = "generalEPGAlwaysFillHoles";
    pub const ALWAYS_REPLACE: &str = "generalEPGAlwaysReplace";

    pub const ALL: [&str; 8] = [
        TITLE_TEMPLATE,
        DESCRIPTION_TEMPLATE,
        LANGUAGES,
        STORE_ONLY_SELECTED,
        RADIO_STORE_ONLY_SELECTED,
        REGRAB_AFTER,
        ALWAYS_FILL_HOLES,
        ALWAYS_REPLACE,
    ];
}

pub const DEFAULT_TITLE_TEMPLATE: &str = "%TITLE%";
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str = "%DESCRIPTION%";
/// Four hours.
pub const DEFAULT_REGRAB_AFTER_MINUTES: i64 = 240;

/// Immutable reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub title_template: String,
    pub description_template: String,
    /// Preferred languages, matched by case-insensitive substring. Empty
    /// accepts any language.
    pub epg_languages: String,
    pub store_only_selected_tv: bool,
    pub store_only_selected_radio: bool,
    pub regrab_after_minutes: i64,
    pub always_fill_holes: bool,
    pub always_replace: bool,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            title_template: DEFAULT_TITLE_TEMPLATE.to_string(),
            description_template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
            epg_languages: String::new(),
            store_only_selected_tv: false,
            store_only_selected_radio: false,
            regrab_after_minutes: DEFAULT_REGRAB_AFTER_MINUTES,
            always_fill_holes: false,
            always_replace: false,
        }
    }
}

impl ConfigSnapshot {
    /// Read every setting once. Missing settings take their defaults; a
    /// regrab interval that is not a 32-bit number falls back to four hours.
    pub fn load<S: SettingsSource + ?Sized>(settings: &S) -> Result<Self> {
        let defaults = Self::default();

        let title_template = settings
            .get_setting(keys::TITLE_TEMPLATE)?
            .unwrap_or(defaults.title_template);
        let description_template = settings
            .get_setting(keys::DESCRIPTION_TEMPLATE)?
            .unwrap_or(defaults.description_template);
        let epg_languages = settings
            .get_setting(keys::LANGUAGES)?
            .unwrap_or(defaults.epg_languages);

        let regrab_after_minutes = match settings.get_setting(keys::REGRAB_AFTER)? {
            Some(value) => value.trim().parse::<i32>().map(i64::from).unwrap_or_else(|_| {
                debug!(
                    "Config: {} = {:?} is not a valid number of minutes, using {}",
                    keys::REGRAB_AFTER,
                    value,
                    DEFAULT_REGRAB_AFTER_MINUTES
                );
                DEFAULT_REGRAB_AFTER_MINUTES
            }),
            None => DEFAULT_REGRAB_AFTER_MINUTES,
        };

        Ok(Self {
            title_template,
            description_template,
            epg_languages,
            store_only_selected_tv: flag(settings, keys::STORE_ONLY_SELECTED)?,
            store_only_selected_radio: flag(settings, keys::RADIO_STORE_ONLY_SELECTED)?,
            regrab_after_minutes,
            always_fill_holes: flag(settings, keys::ALWAYS_FILL_HOLES)?,
            always_replace: flag(settings, keys::ALWAYS_REPLACE)?,
        })
    }

    /// Whether grabbing is restricted to selected channels of this media type.
    pub fn store_only_selected(&self, media_type: MediaType) -> bool {
        match media_type {
            MediaType::Tv => self.store_only_selected_tv,
            MediaType::Radio => self.store_only_selected_radio,
        }
    }
}

/// Boolean settings are stored as "yes"/"no".
fn flag<S: SettingsSource + ?Sized>(settings: &S, name: &str) -> Result<bool> {
    Ok(settings
        .get_setting(name)?
        .map(|v| v.trim().eq_ignore_ascii_case("yes"))
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ConfigSnapshot::load(&HashMap::<String, String>::new()).unwrap();
        assert_eq!(config, ConfigSnapshot::default());
        assert_eq!(config.title_template, "%TITLE%");
        assert_eq!(config.description_template, "%DESCRIPTION%");
        assert_eq!(config.regrab_after_minutes, 240);
    }

    #[test]
    fn test_load_all_keys() {
        let config = ConfigSnapshot::load(&settings(&[
            (keys::TITLE_TEMPLATE, "%TITLE% %STARRATING_STR%"),
            (keys::DESCRIPTION_TEMPLATE, "%GENRE%%NEWLINE%%DESCRIPTION%"),
            (keys::LANGUAGES, "ger,eng"),
            (keys::STORE_ONLY_SELECTED, "yes"),
            (keys::RADIO_STORE_ONLY_SELECTED, "no"),
            (keys::REGRAB_AFTER, "60"),
            (keys::ALWAYS_FILL_HOLES, "yes"),
            (keys::ALWAYS_REPLACE, "no"),
        ]))
        .unwrap();

        assert_eq!(config.title_template, "%TITLE% %STARRATING_STR%");
        assert_eq!(config.epg_languages, "ger,eng");
        assert!(config.store_only_selected_tv);
        assert!(!config.store_only_selected_radio);
        assert_eq!(config.regrab_after_minutes, 60);
        assert!(config.always_fill_holes);
        assert!(!config.always_replace);
        assert!(config.store_only_selected(MediaType::Tv));
        assert!(!config.store_only_selected(MediaType::Radio));
    }

    #[test]
    fn test_non_numeric_regrab_interval_falls_back() {
        let config =
            ConfigSnapshot::load(&settings(&[(keys::REGRAB_AFTER, "four hours")])).unwrap();
        assert_eq!(config.regrab_after_minutes, DEFAULT_REGRAB_AFTER_MINUTES);
    }

    #[test]
    fn test_oversized_regrab_interval_falls_back() {
        let config = ConfigSnapshot::load(&settings(&[(
            keys::REGRAB_AFTER,
            "9223372036854775807",
        )]))
        .unwrap();
        assert_eq!(config.regrab_after_minutes, DEFAULT_REGRAB_AFTER_MINUTES);

        let config =
            ConfigSnapshot::load(&settings(&[(keys::REGRAB_AFTER, "-2147483648")])).unwrap();
        assert_eq!(config.regrab_after_minutes, i64::from(i32::MIN));
    }

    #[test]
    fn test_flags_require_yes() {
        let config = ConfigSnapshot::load(&settings(&[
            (keys::ALWAYS_REPLACE, "true"),
            (keys::ALWAYS_FILL_HOLES, "YES"),
        ]))
        .unwrap();
        assert!(!config.always_replace);
        assert!(config.always_fill_holes);
    }

    #[test]
    fn test_load_from_database() {
        let db = crate::database::Database::open_in_memory().unwrap();
        db.set_setting(keys::ALWAYS_REPLACE, "yes").unwrap();
        let config = ConfigSnapshot::load(&db).unwrap();
        assert!(config.always_replace);
    }
}
