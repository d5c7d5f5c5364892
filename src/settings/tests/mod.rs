//! Unit tests for settings, the registry and sources.
//! No filesystem or global subscriber.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{cell::RefCell, rc::Rc};

use toml::{Table, Value};

use crate::{
    SettingsError,
    logging::LogLevel,
    settings::{
        ApplyOutcome, CollectingSink, ConfigSource, MapSource, PluginSettings, Setting,
        SettingChange, SettingsRegistry,
    },
    tracing_config,
};

type Calls = Rc<RefCell<Vec<(String, Value, Value)>>>;

fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

fn recorder(setting: &mut Setting, tag: &str) -> Calls {
    let calls: Calls = Rc::default();
    let sink = Rc::clone(&calls);
    setting
        .add_listener(tag, move |change: &SettingChange| {
            sink.borrow_mut().push((
                change.name.clone(),
                change.old_value.clone(),
                change.new_value.clone(),
            ));
        })
        .unwrap();
    calls
}

fn table(content: &str) -> Table {
    toml::from_str(content).unwrap()
}

mod setting {
    use super::*;

    #[test]
    fn starts_at_validated_default() {
        let setting = Setting::log_level("log_level", "WARNING").unwrap();

        assert_eq!(setting.value(), &string("warning"));
        assert_eq!(setting.default_value(), &string("WARNING"));
        assert_eq!(setting.name(), "log_level");
    }

    #[test]
    fn invalid_default_fails_construction() {
        let result = Setting::integer_range("tab_size", 20, 1, 8);

        assert!(matches!(
            result,
            Err(SettingsError::InvalidDefault { ref name, .. }) if name == "tab_size"
        ));
    }

    #[test]
    fn applying_same_value_twice_dispatches_once() {
        let mut setting = Setting::log_level("log_level", "warning").unwrap();
        let calls = recorder(&mut setting, "test");

        assert!(setting.apply(&string("debug")).is_changed());
        assert_eq!(setting.apply(&string("DEBUG")), ApplyOutcome::Unchanged);

        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn rejection_keeps_current_value() {
        let mut setting = Setting::log_level("log_level", "warning").unwrap();
        let calls = recorder(&mut setting, "test");

        let outcome = setting.apply(&string("trace"));

        assert_eq!(setting.value(), &string("warning"));
        assert!(calls.borrow().is_empty());
        assert_eq!(
            outcome.diagnostic(),
            Some(
                "Value 'trace' for setting 'log_level' not supported. \
                 Allowed values are ['debug', 'info', 'warning', 'error']."
            )
        );
    }

    #[test]
    fn invalid_shape_reports_failure_reason() {
        let mut setting = Setting::log_level("log_level", "warning").unwrap();

        let outcome = setting.apply(&Value::Integer(3));

        let Some(message) = outcome.diagnostic() else {
            panic!("expected a rejection, got {outcome:?}");
        };
        assert!(message.starts_with("Failed validating value 3 for setting 'log_level':\n"));
        assert_eq!(setting.value(), &string("warning"));
    }

    #[test]
    fn validated_false_is_applied() {
        let mut setting = Setting::boolean("show_hidden", true).unwrap();
        let calls = recorder(&mut setting, "test");

        let outcome = setting.apply(&string("False"));

        assert!(outcome.is_changed());
        assert_eq!(setting.value(), &Value::Boolean(false));
        assert_eq!(
            calls.borrow()[0],
            (
                "show_hidden".to_string(),
                Value::Boolean(true),
                Value::Boolean(false)
            )
        );
    }

    #[test]
    fn zero_is_applied() {
        let mut setting = Setting::integer_range("depth", 3, 0, 5).unwrap();

        assert!(setting.apply(&Value::Integer(0)).is_changed());
        assert_eq!(setting.value(), &Value::Integer(0));
    }

    #[test]
    fn raw_string_equality_short_circuits_before_validation() {
        let mut setting = Setting::boolean("flag", true).unwrap();
        let calls = recorder(&mut setting, "test");

        assert_eq!(setting.apply(&string("TRUE")), ApplyOutcome::Unchanged);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn reset_to_default_restores_default() {
        let mut setting = Setting::typed("font", "mono").unwrap();
        setting.apply(&string("serif"));

        let outcome = setting.reset_to_default();

        assert!(outcome.is_changed());
        assert_eq!(setting.value(), &string("mono"));
    }

    #[test]
    fn duplicate_listener_tag_fails() {
        let mut setting = Setting::boolean("flag", true).unwrap();
        setting.add_listener("owner", |_: &SettingChange| {}).unwrap();

        let result = setting.add_listener("owner", |_: &SettingChange| {});

        assert!(matches!(
            result,
            Err(SettingsError::DuplicateListener { ref tag, .. }) if tag == "owner"
        ));
        assert_eq!(setting.listener_count(), 1);
    }

    #[test]
    fn tag_can_be_reused_after_removal() {
        let mut setting = Setting::boolean("flag", true).unwrap();
        setting.add_listener("owner", |_: &SettingChange| {}).unwrap();

        setting.remove_listener("owner").unwrap();

        assert!(!setting.has_listener("owner"));
        assert!(setting.add_listener("owner", |_: &SettingChange| {}).is_ok());
    }

    #[test]
    fn removing_unknown_tag_fails() {
        let mut setting = Setting::boolean("flag", true).unwrap();

        let result = setting.remove_listener("nobody");

        assert!(matches!(result, Err(SettingsError::UnknownListener { .. })));
    }

    #[test]
    fn every_listener_receives_the_change() {
        let mut setting = Setting::log_level("log_level", "warning").unwrap();
        let first = recorder(&mut setting, "first");
        let second = recorder(&mut setting, "second");

        setting.apply(&string("info"));

        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn list_of_strings_setting_accepts_arrays() {
        let mut setting =
            Setting::list_of_strings("folders", vec!["src".to_string()]).unwrap();

        let raw = Value::Array(vec![string("src"), string("tests")]);
        assert!(setting.apply(&raw).is_changed());
        assert_eq!(setting.value(), &raw);
    }
}

mod registry {
    use super::*;

    fn registry_with_log_level() -> (SettingsRegistry, CollectingSink, Calls) {
        let sink = CollectingSink::new();
        let mut registry = SettingsRegistry::new(sink.clone());
        let mut setting = Setting::log_level("log_level", "warning").unwrap();
        let calls = recorder(&mut setting, "test");
        registry.register(setting).unwrap();
        (registry, sink, calls)
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = SettingsRegistry::new(CollectingSink::new());
        registry
            .register(Setting::boolean("flag", true).unwrap())
            .unwrap();

        let result = registry.register(Setting::boolean("flag", false).unwrap());

        assert!(matches!(
            result,
            Err(SettingsError::DuplicateSetting { ref name }) if name == "flag"
        ));
    }

    #[test]
    fn unknown_lookup_fails() {
        let registry = SettingsRegistry::new(CollectingSink::new());

        assert!(matches!(
            registry.get("missing"),
            Err(SettingsError::UnknownSetting { .. })
        ));
    }

    #[test]
    fn reload_applies_and_is_idempotent() {
        let (mut registry, sink, calls) = registry_with_log_level();
        let source = table(r#"log_level = "DEBUG""#);

        let report = registry.reload(&source);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(registry.value("log_level").unwrap(), &string("debug"));
        assert_eq!(
            calls.borrow().as_slice(),
            [(
                "log_level".to_string(),
                string("warning"),
                string("debug")
            )]
        );

        let report = registry.reload(&source);
        assert!(report.changes.is_empty());
        assert_eq!(calls.borrow().len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_key_resets_to_default() {
        let (mut registry, _sink, calls) = registry_with_log_level();
        registry.reload(&table(r#"log_level = "error""#));

        registry.reload(&Table::new());

        assert_eq!(registry.value("log_level").unwrap(), &string("warning"));
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn rejected_value_does_not_stop_the_pass() {
        let sink = CollectingSink::new();
        let mut registry = SettingsRegistry::new(sink.clone());
        registry
            .register(Setting::log_level("log_level", "warning").unwrap())
            .unwrap();
        registry
            .register(Setting::integer_range("tab_size", 4, 1, 8).unwrap())
            .unwrap();
        registry
            .register(Setting::boolean("wrap", false).unwrap())
            .unwrap();

        let report = registry.reload(&table(
            r#"
log_level = "verbose"
tab_size = 2
wrap = true
"#,
        ));

        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(registry.value("log_level").unwrap(), &string("warning"));
        assert_eq!(registry.value("tab_size").unwrap(), &Value::Integer(2));
        assert_eq!(registry.value("wrap").unwrap(), &Value::Boolean(true));
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn single_unknown_key_uses_singular_warning() {
        let (mut registry, sink, _calls) = registry_with_log_level();

        let report = registry.reload(&table("bogus = 1"));

        assert_eq!(report.unknown_keys, ["bogus"]);
        assert_eq!(sink.messages(), ["Unknown setting 'bogus'."]);
    }

    #[test]
    fn several_unknown_keys_use_plural_warning() {
        let (mut registry, sink, _calls) = registry_with_log_level();

        registry.reload(&table("bogus2 = 1\nbogus1 = 1"));

        assert_eq!(
            sink.messages(),
            ["Unknown settings ['bogus1', 'bogus2']."]
        );
    }

    #[test]
    fn detach_removes_tag_everywhere() {
        let mut registry = SettingsRegistry::new(CollectingSink::new());
        let mut first = Setting::boolean("a", true).unwrap();
        first.add_listener("owner", |_: &SettingChange| {}).unwrap();
        let mut second = Setting::boolean("b", true).unwrap();
        second.add_listener("owner", |_: &SettingChange| {}).unwrap();
        second.add_listener("other", |_: &SettingChange| {}).unwrap();
        registry.register(first).unwrap();
        registry.register(second).unwrap();
        registry
            .register(Setting::boolean("c", true).unwrap())
            .unwrap();

        assert_eq!(registry.detach("owner"), 2);
        assert_eq!(registry.detach("owner"), 0);
        assert!(registry.get("b").unwrap().has_listener("other"));
    }

    #[test]
    fn snapshot_lists_current_values() {
        let (mut registry, _sink, _calls) = registry_with_log_level();
        registry.reload(&table(r#"log_level = "Info""#));

        let snapshot = registry.snapshot();

        assert_eq!(snapshot.get("log_level"), Some(&string("info")));
        assert_eq!(registry.names(), ["log_level"]);
        assert_eq!(registry.len(), 1);
    }
}

mod source {
    use super::*;

    #[test]
    fn parses_toml_text() {
        let source = MapSource::from_toml_str("log_level = \"info\"\ncount = 3").unwrap();

        assert_eq!(source.get("log_level"), Some(string("info")));
        let mut keys = source.keys();
        keys.sort();
        assert_eq!(keys, ["count", "log_level"]);
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = MapSource::from_toml_str("log_level = ");

        assert!(matches!(result, Err(SettingsError::TomlParse { .. })));
    }

    #[test]
    fn mutations_notify_watchers() {
        let mut source = MapSource::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        source
            .add_on_change("owner", move |source: &dyn ConfigSource| {
                sink.borrow_mut().push(source.get("key"));
            })
            .unwrap();

        source.set("key", "one");
        source.remove("key");

        assert_eq!(*seen.borrow(), [Some(string("one")), None]);
    }

    #[test]
    fn watcher_tags_are_unique() {
        let mut source = MapSource::default();
        source
            .add_on_change("owner", |_: &dyn ConfigSource| {})
            .unwrap();

        assert!(matches!(
            source.add_on_change("owner", |_: &dyn ConfigSource| {}),
            Err(SettingsError::DuplicateListener { .. })
        ));

        source.clear_on_change("owner").unwrap();
        assert!(matches!(
            source.clear_on_change("owner"),
            Err(SettingsError::UnknownListener { .. })
        ));
    }
}

mod plugin {
    use super::*;

    #[test]
    fn init_reloads_and_follows_source() {
        let (logging, _dispatch) = tracing_config::scoped(LogLevel::Warning);
        let mut source = MapSource::from_toml_str(r#"log_level = "info""#).unwrap();
        let sink = CollectingSink::new();

        let settings =
            PluginSettings::init(&mut source, "plugin", LogLevel::Warning, &logging, sink.clone())
                .unwrap();

        assert_eq!(settings.log_level().unwrap(), LogLevel::Info);
        assert_eq!(logging.level().unwrap(), Some(LogLevel::Info));

        source.set("log_level", "ERROR");
        assert_eq!(settings.log_level().unwrap(), LogLevel::Error);
        assert_eq!(logging.level().unwrap(), Some(LogLevel::Error));

        source.set("unknown", true);
        assert_eq!(sink.messages(), ["Unknown setting 'unknown'."]);
    }

    #[test]
    fn init_aligns_logging_with_default_when_key_is_missing() {
        let (logging, _dispatch) = tracing_config::scoped(LogLevel::Debug);
        let mut source = MapSource::default();

        let settings = PluginSettings::init(
            &mut source,
            "plugin",
            LogLevel::Warning,
            &logging,
            CollectingSink::new(),
        )
        .unwrap();

        assert_eq!(settings.log_level().unwrap(), LogLevel::Warning);
        assert_eq!(logging.level().unwrap(), Some(LogLevel::Warning));
    }

    #[test]
    fn init_aligns_logging_with_default_when_value_is_rejected() {
        let (logging, _dispatch) = tracing_config::scoped(LogLevel::Error);
        let mut source = MapSource::from_toml_str(r#"log_level = "verbose""#).unwrap();
        let sink = CollectingSink::new();

        let settings =
            PluginSettings::init(&mut source, "plugin", LogLevel::Info, &logging, sink.clone())
                .unwrap();

        assert_eq!(settings.log_level().unwrap(), LogLevel::Info);
        assert_eq!(logging.level().unwrap(), Some(LogLevel::Info));
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn deinit_stops_following_source() {
        let (logging, _dispatch) = tracing_config::scoped(LogLevel::Warning);
        let mut source = MapSource::default();
        let settings = PluginSettings::init(
            &mut source,
            "plugin",
            LogLevel::Warning,
            &logging,
            CollectingSink::new(),
        )
        .unwrap();
        let registry = settings.registry();

        settings.deinit(&mut source).unwrap();
        source.set("log_level", "debug");

        let registry = registry.borrow();
        assert_eq!(registry.value("log_level").unwrap(), &string("warning"));
        assert_eq!(registry.get("log_level").unwrap().listener_count(), 0);
        assert_eq!(logging.level().unwrap(), Some(LogLevel::Warning));
    }

    #[test]
    fn init_twice_with_same_tag_fails() {
        let (logging, _dispatch) = tracing_config::scoped(LogLevel::Warning);
        let mut source = MapSource::default();
        let _first = PluginSettings::init(
            &mut source,
            "plugin",
            LogLevel::Warning,
            &logging,
            CollectingSink::new(),
        )
        .unwrap();

        let second = PluginSettings::init(
            &mut source,
            "plugin",
            LogLevel::Warning,
            &logging,
            CollectingSink::new(),
        );

        assert!(matches!(
            second,
            Err(SettingsError::DuplicateListener { .. })
        ));
    }
}
