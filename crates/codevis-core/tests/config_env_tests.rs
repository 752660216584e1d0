//! Environment overrides mutate process state, so this file holds a single
//! test and runs as its own binary.

use std::env;
use std::fs;

use codevis_core::Config;
use tempfile::TempDir;

const OVERRIDES: [(&str, &str); 5] = [
    ("CODEVIS_STORE_ADDRESS", "wss://graph.example.com"),
    ("CODEVIS_STORE_USERNAME", "ci"),
    ("CODEVIS_STORE_PASSWORD", "from-env"),
    ("CODEVIS_ANALYSIS_DIR", "/srv/analysis"),
    ("CODEVIS_PROGRAM", "payments"),
];

#[test]
fn test_env_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codevis.toml");
    fs::write(
        &path,
        r#"
[store]
address = "ws://127.0.0.1:8000"
username = "root"
password = "secret"
namespace = "team"

[analysis]
dir = "out"
program = "billing"
"#,
    )
    .unwrap();

    let saved: Vec<_> = OVERRIDES.iter().map(|(key, _)| (*key, env::var(key).ok())).collect();
    for (key, value) in OVERRIDES {
        env::set_var(key, value);
    }

    let loaded = Config::from_file(&path);

    for (key, value) in saved {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }

    let config = loaded.unwrap();
    assert_eq!(config.store.address, "wss://graph.example.com");
    assert_eq!(config.store.username, "ci");
    assert_eq!(config.store.password, "from-env");
    assert_eq!(config.analysis.dir, "/srv/analysis");
    assert_eq!(config.analysis.program_name(), "payments");
    // Settings without an override keep the file value.
    assert_eq!(config.store.namespace, "team");
}
