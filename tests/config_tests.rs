// Config loading and validation tests

use std::sync::Mutex;

use sysmetrics::config::AppConfig;

// load() reads the process-wide environment and working directory
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VALID_CONFIG: &str = r#"
[provider]
proc_root = "/hostfs/proc"

[collection]
system = true
cpu_per_core = true
process = true
connections = false
filesystem = true
procs = ["^nginx", "postgres"]
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.provider.proc_root, "/hostfs/proc");
    assert!(config.collection.cpu_per_core);
    assert!(!config.collection.connections);
    assert_eq!(config.collection.procs, vec!["^nginx", "postgres"]);
    assert_eq!(config.collection.proc_patterns().unwrap().len(), 2);
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = AppConfig::load_from_str("").expect("defaults");
    assert_eq!(config.provider.proc_root, "/proc");
    assert!(config.collection.system);
    assert!(!config.collection.cpu_per_core);
    assert!(config.collection.process);
    assert!(config.collection.connections);
    assert!(config.collection.filesystem);
    assert_eq!(config.collection.procs, vec![".*"]);
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let config = AppConfig::load_from_str("[collection]\nfilesystem = false\n").unwrap();
    assert!(!config.collection.filesystem);
    assert!(config.collection.system);
    assert_eq!(config.provider.proc_root, "/proc");
}

#[test]
fn test_config_validation_rejects_empty_proc_root() {
    let bad = VALID_CONFIG.replace("proc_root = \"/hostfs/proc\"", "proc_root = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("provider.proc_root"));
}

#[test]
fn test_config_validation_rejects_all_families_disabled() {
    let bad = VALID_CONFIG
        .replace("system = true", "system = false")
        .replace("process = true", "process = false")
        .replace("filesystem = true", "filesystem = false");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("at least one of"));
}

#[test]
fn test_config_validation_rejects_empty_procs() {
    let bad = VALID_CONFIG.replace("procs = [\"^nginx\", \"postgres\"]", "procs = []");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collection.procs"));
}

#[test]
fn test_config_validation_rejects_invalid_regex() {
    let bad = VALID_CONFIG.replace("\"postgres\"", "\"[unclosed\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("invalid regex"));
}

#[test]
fn test_config_rejects_malformed_toml() {
    assert!(AppConfig::load_from_str("[collection\nsystem = ").is_err());
}

#[test]
fn test_config_load_from_file_via_env() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.provider.proc_root, "/hostfs/proc");
    assert_eq!(config.collection.procs, vec!["^nginx", "postgres"]);
}

#[test]
fn test_config_load_missing_env_file_is_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let err = result.unwrap_err();
    assert!(err.to_string().contains("read config"));
}

#[test]
fn test_config_load_default_file_or_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::TempDir::new().unwrap();
    let previous = std::env::current_dir().unwrap();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    std::env::set_current_dir(dir.path()).unwrap();

    let defaults = AppConfig::load();
    std::fs::write(dir.path().join("sysmetrics.toml"), VALID_CONFIG).unwrap();
    let from_file = AppConfig::load();

    std::env::set_current_dir(previous).unwrap();

    let defaults = defaults.expect("defaults without sysmetrics.toml");
    assert_eq!(defaults.provider.proc_root, "/proc");
    assert_eq!(defaults.collection.procs, vec![".*"]);
    let from_file = from_file.expect("load sysmetrics.toml");
    assert_eq!(from_file.provider.proc_root, "/hostfs/proc");
    assert!(from_file.collection.cpu_per_core);
}
