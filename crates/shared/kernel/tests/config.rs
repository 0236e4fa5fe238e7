use brgy_kernel::config::{load_config, load_config_with_env};
use brgy_kernel::domain::config::ApiConfig;
use std::io::Write;

fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg: ApiConfig = load_config_with_env(Some(dir.path().join("absent.toml")), vars(&[]))
        .expect("defaults without a file");

    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.url, "mem://");
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn file_values_are_loaded() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[server]
port = 9443

[database]
url = "ws://db.internal:8000"
namespace = "brgy"
database = "prod"

[evidence]
vision_model = "vision-large"
"#
    )
    .unwrap();

    let cfg: ApiConfig = load_config_with_env(Some(file.path()), vars(&[])).unwrap();
    assert_eq!(cfg.server.port, 9443);
    assert_eq!(cfg.database.url, "ws://db.internal:8000");
    assert_eq!(cfg.evidence.vision_model, "vision-large");
    assert_eq!(cfg.evidence.text_model, "gpt-4o-mini");
}

#[test]
fn environment_overrides_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[server]\nport = 9443\n").unwrap();

    let cfg: ApiConfig = load_config_with_env(
        Some(file.path()),
        vars(&[
            ("BRGY__SERVER__PORT", "7000"),
            ("BRGY__EVIDENCE__API_KEY", "sk-from-env"),
            ("BRGY__SECURITY__IDENTITY__JWT__SECRET", "env-secret"),
            ("UNRELATED__SERVER__PORT", "1"),
        ]),
    )
    .unwrap();

    assert_eq!(cfg.server.port, 7000);
    assert_eq!(cfg.evidence.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(cfg.security.identity.jwt.secret, "env-secret");
}

#[test]
fn malformed_values_are_errors() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[server]\nport = \"not-a-port\"\n").unwrap();

    assert!(load_config::<ApiConfig>(Some(file.path())).is_err());
}
