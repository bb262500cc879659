use super::*;
use rstest::rstest;

const ALL_VARS: [&str; 8] = [
    "OAUTH_CLIENT_ID",
    "OAUTH_CLIENT_SECRET",
    "OAUTH_REFRESH_TOKEN",
    "SENDER_EMAIL",
    "MAILGATE__MAIL__SMTP_PORT",
    "MAILGATE__SERVER__PORT",
    "MAILGATE__MAIL__SENDER",
    "RUN_MODE",
];

fn env_with(pairs: &[(&'static str, &'static str)]) -> Vec<(&'static str, Option<&'static str>)> {
    ALL_VARS
        .iter()
        .map(|var| {
            let value = pairs.iter().find(|(k, _)| k == var).map(|(_, v)| *v);
            (*var, value)
        })
        .collect()
}

fn complete_env() -> Vec<(&'static str, Option<&'static str>)> {
    env_with(&[
        ("OAUTH_CLIENT_ID", "client-id"),
        ("OAUTH_CLIENT_SECRET", "client-secret"),
        ("OAUTH_REFRESH_TOKEN", "1//refresh"),
        ("SENDER_EMAIL", "sender@example.com"),
    ])
}

fn valid_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        oauth: OAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: SecretString::new("client-secret".to_string()),
            refresh_token: SecretString::new("1//refresh".to_string()),
            ..OAuthConfig::default()
        },
        mail: MailConfig {
            sender: "sender@example.com".to_string(),
            ..MailConfig::default()
        },
        uploads: UploadConfig::default(),
    }
}

#[test]
fn test_load_from_well_known_env() {
    temp_env::with_vars(complete_env(), || {
        let config = AppConfig::load().unwrap();

        assert_eq!(config.oauth.client_id, "client-id");
        assert_eq!(config.oauth.client_secret.expose_secret(), "client-secret");
        assert_eq!(config.oauth.refresh_token.expose_secret(), "1//refresh");
        assert_eq!(config.mail.sender, "sender@example.com");
    });
}

#[test]
fn test_load_applies_defaults() {
    temp_env::with_vars(complete_env(), || {
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 465);
        assert_eq!(config.oauth.token_url, "https://oauth2.googleapis.com/token");
        assert_eq!(config.uploads.attachments_dir, PathBuf::from("./attachments"));
        assert_eq!(config.uploads.max_upload_bytes, 25 * 1024 * 1024);
    });
}

#[test]
fn test_prefixed_env_overrides_defaults() {
    let mut vars = complete_env();
    vars.retain(|(k, _)| *k != "MAILGATE__MAIL__SMTP_PORT" && *k != "MAILGATE__SERVER__PORT");
    vars.push(("MAILGATE__MAIL__SMTP_PORT", Some("2525")));
    vars.push(("MAILGATE__SERVER__PORT", Some("8081")));

    temp_env::with_vars(vars, || {
        let config = AppConfig::load().unwrap();

        assert_eq!(config.mail.smtp_port, 2525);
        assert_eq!(config.server.port, 8081);
    });
}

#[test]
fn test_well_known_env_wins_over_prefixed() {
    let mut vars = complete_env();
    vars.retain(|(k, _)| *k != "MAILGATE__MAIL__SENDER");
    vars.push(("MAILGATE__MAIL__SENDER", Some("other@example.com")));

    temp_env::with_vars(vars, || {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.mail.sender, "sender@example.com");
    });
}

#[test]
fn test_load_fails_without_refresh_token() {
    let vars = env_with(&[
        ("OAUTH_CLIENT_ID", "client-id"),
        ("OAUTH_CLIENT_SECRET", "client-secret"),
        ("SENDER_EMAIL", "sender@example.com"),
    ]);

    temp_env::with_vars(vars, || {
        let result = AppConfig::load();
        assert!(matches!(
            result,
            Err(ConfigurationError::Missing("oauth.refresh_token"))
        ));
    });
}

#[rstest]
#[case::client_id("oauth.client_id")]
#[case::client_secret("oauth.client_secret")]
#[case::refresh_token("oauth.refresh_token")]
#[case::sender("mail.sender")]
fn test_validate_rejects_blank_value(#[case] key: &'static str) {
    let mut config = valid_config();
    match key {
        "oauth.client_id" => config.oauth.client_id = "  ".to_string(),
        "oauth.client_secret" => config.oauth.client_secret = SecretString::new(String::new()),
        "oauth.refresh_token" => config.oauth.refresh_token = SecretString::new(String::new()),
        _ => config.mail.sender = String::new(),
    }

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigurationError::Missing(k) if k == key));
}

#[test]
fn test_validate_rejects_sender_without_at() {
    let mut config = valid_config();
    config.mail.sender = "not-an-address".to_string();

    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::Invalid {
            key: "mail.sender",
            ..
        }
    ));
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let mut config = valid_config();
    config.mail.timeout_secs = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_accepts_complete_config() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_credentials_and_timeouts() {
    let config = valid_config();
    let creds = config.oauth.credentials();

    assert_eq!(creds.client_id(), "client-id");
    assert_eq!(creds.refresh_token(), "1//refresh");
    assert_eq!(config.oauth.timeout(), Duration::from_secs(10));
    assert_eq!(config.mail.timeout(), Duration::from_secs(30));
}

#[test]
fn test_configuration_error_display() {
    assert_eq!(
        ConfigurationError::Missing("mail.sender").to_string(),
        "missing required configuration value: mail.sender"
    );
}
