use super::*;
use clap::Parser;
use std::io::Write;

#[test]
fn test_parse_select_with_budget() {
    let cli = Cli::try_parse_from([
        "companion",
        "select",
        "--history",
        "history.json",
        "--max-tokens",
        "40",
    ])
    .unwrap();
    match cli.command {
        Commands::Select {
            history,
            max_tokens,
        } => {
            assert_eq!(history.to_str(), Some("history.json"));
            assert_eq!(max_tokens, Some(40));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_send_defaults_conversation_id() {
    let cli = Cli::try_parse_from([
        "companion", "send", "--history", "h.json", "--text", "hello",
    ])
    .unwrap();
    match cli.command {
        Commands::Send {
            conversation_id,
            text,
            ..
        } => {
            assert_eq!(conversation_id, "cli");
            assert_eq!(text, "hello");
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_load_history_reads_messages() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"id": "1", "role": "user", "text": "hi", "timestamp": "2024-05-01T12:00:00Z"}},
            {{"id": "2", "role": "assistant", "text": "hello", "timestamp": "2024-05-01T12:01:00Z", "safetyFlag": false}}
        ]"#
    )
    .unwrap();

    let messages = load_history(file.path()).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].safety_flag, Some(false));
}

#[test]
fn test_load_history_reports_bad_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let err = load_history(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid history JSON"));
}
