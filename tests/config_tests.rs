use loqa_converse::{Config, ConverseError, Credentials};
use std::collections::HashMap;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults_without_config_file() {
    let cfg = Config::load("/nonexistent/loqa-converse").unwrap();

    assert_eq!(cfg.service.http.port, 3000);
    assert_eq!(cfg.transcription.model, "nova-2-phonecall");
    assert_eq!(cfg.transcription.endpointing_ms, 400);
    assert_eq!(cfg.completion.model, "llama3-8b-8192");
    assert_eq!(cfg.synthesis.voice_engine, "PlayHT2.0-turbo");
    assert_eq!(cfg.conversation.termination_keyword, "disconnect");
    assert!(cfg.completion.system_prompt.contains("EmoBuddy"));
}

#[test]
fn test_file_overrides_selected_keys() {
    let file = write_config(
        r#"
[service.http]
port = 8080
public_dir = "static"

[transcription]
keepalive_secs = 3

[conversation]
termination_keyword = "goodbye"
"#,
    );

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.service.http.port, 8080);
    assert_eq!(cfg.service.http.public_dir.to_str(), Some("static"));
    assert_eq!(cfg.service.http.bind, "0.0.0.0");
    assert_eq!(cfg.transcription.keepalive_interval().as_secs(), 3);
    assert_eq!(cfg.transcription.language, "en");
    assert_eq!(cfg.conversation.termination_keyword, "goodbye");
}

#[test]
fn test_keepalive_interval_has_floor() {
    let file = write_config("[transcription]\nkeepalive_secs = 0\n");
    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();

    assert_eq!(cfg.transcription.keepalive_interval().as_secs(), 1);
}

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_credentials_all_present() {
    let credentials = Credentials::from_lookup(lookup(&[
        ("DEEPGRAM_API_KEY", "dg"),
        ("GROQ_API_KEY", "gq"),
        ("PLAY_API_KEY", "ph"),
        ("PLAY_USERID", "user-1"),
    ]))
    .unwrap();

    assert_eq!(credentials.deepgram_api_key, "dg");
    assert_eq!(credentials.groq_api_key, "gq");
    assert_eq!(credentials.play_api_key, "ph");
    assert_eq!(credentials.play_user_id, "user-1");

    let debug = format!("{:?}", credentials);
    assert!(!debug.contains("\"dg\""));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_credentials_report_every_missing_name() {
    let err = Credentials::from_lookup(lookup(&[
        ("DEEPGRAM_API_KEY", "dg"),
        ("PLAY_API_KEY", "   "),
    ]))
    .unwrap_err();

    match &err {
        ConverseError::MissingCredentials(missing) => {
            assert_eq!(missing, &["GROQ_API_KEY", "PLAY_API_KEY", "PLAY_USERID"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let message = err.to_string();
    assert!(message.contains("GROQ_API_KEY"));
    assert!(message.contains("PLAY_USERID"));
}
