// Environment variables are process-wide, so this binary holds a single test.

use std::io::Write;

use dynafinder::family::{COUNT_BY, FIND_BY};
use dynafinder::finder::Finders;
use dynafinder::settings::FinderSettings;

const OVERRIDES: [(&str, &str); 3] = [
    ("DYNAFINDER__OPERATORS", "Or"),
    ("DYNAFINDER__FAMILIES", "countBy,findBy"),
    ("DYNAFINDER__LOG_FILTER", "warn"),
];

#[test]
fn environment_overrides_settings() {
    // SAFETY: no other test runs in this binary, so nothing reads the environment concurrently
    unsafe {
        for (key, value) in OVERRIDES {
            std::env::set_var(key, value);
        }
    }

    let settings = FinderSettings::load(None).expect("settings");
    assert_eq!(settings.operators, vec!["Or".to_string()]);
    assert_eq!(settings.families, vec![COUNT_BY.to_string(), FIND_BY.to_string()]);
    assert_eq!(settings.log_filter, "warn");

    let finders = Finders::from_settings(&settings).expect("finders");
    assert!(finders.finder_for("countByAge").is_some());
    assert!(finders.finder_for("findAllByAge").is_none());

    // the environment wins over the file
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().expect("temp file");
    file.write_all(br#"{ "operators": ["And"], "log_filter": "debug" }"#)
        .expect("settings written");
    file.flush().expect("settings flushed");
    let settings = FinderSettings::load(Some(file.path())).expect("settings");
    assert_eq!(settings.operators, vec!["Or".to_string()]);
    assert_eq!(settings.log_filter, "warn");

    unsafe {
        for (key, _) in OVERRIDES {
            std::env::remove_var(key);
        }
    }
    assert_eq!(FinderSettings::load(None).expect("settings"), FinderSettings::default());
}
