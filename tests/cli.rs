use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway home, config and data directory so runs never touch the
/// user's own dictionaries.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn words(&self) -> PathBuf {
        self.write("words.dic", "3\nhello/S\nworld\nthere\n")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("spellflow").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env_remove("RUST_LOG");
        cmd
    }
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn test_check_clean_file() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();
    let file = sandbox.write("clean.txt", "hello world\nhello there\n");

    let assert = sandbox
        .cmd()
        .args(["check", "--no-color", "--dic"])
        .arg(&dic)
        .arg(&file)
        .assert()
        .success();

    assert!(stdout_of(&assert).contains("No spelling errors found"));
}

#[test]
fn test_check_reports_misspellings_and_fails() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();
    let file = sandbox.write("typo.txt", "hello wrold\n");

    let assert = sandbox
        .cmd()
        .args(["check", "--no-color", "--dic"])
        .arg(&dic)
        .arg(&file)
        .assert()
        .code(1);

    let stdout = stdout_of(&assert);
    assert!(stdout.contains("1:7 wrold hello wrold"));
    assert!(stdout.contains("→ world"));
    assert!(stdout.contains("1 error found in 1 file"));
}

#[test]
fn test_no_fail_exits_zero() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();
    let file = sandbox.write("typo.txt", "hello wrold\n");

    sandbox
        .cmd()
        .args(["check", "--no-color", "--no-fail", "--dic"])
        .arg(&dic)
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_json_output() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();
    let file = sandbox.write("typo.txt", "hello\n  wrold there\n");

    let assert = sandbox
        .cmd()
        .args(["check", "-o", "json", "--no-fail", "--dic"])
        .arg(&dic)
        .arg(&file)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&stdout_of(&assert)).unwrap();
    assert_eq!(report["files_checked"], 1);
    assert_eq!(report["total_errors"], 1);

    let error = &report["files"][0]["errors"][0];
    assert_eq!(error["word"], "wrold");
    assert_eq!(error["line"], 2);
    assert_eq!(error["column"], 3);
    assert_eq!(error["context"], "wrold there");
    assert_eq!(error["suggestions"][0], "world");
}

#[test]
fn test_session_and_personal_words_are_accepted() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();
    let file = sandbox.write("typo.txt", "hello wrold Rustacean\n");
    let personal = sandbox.write("personal.txt", "# my words\nrustacean\n");

    sandbox
        .cmd()
        .args(["check", "--no-color", "--add-to-dict", "wrold", "--dic"])
        .arg(&dic)
        .arg("--personal-dict")
        .arg(&personal)
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_without_dictionary_nothing_is_flagged() {
    let sandbox = Sandbox::new();
    let file = sandbox.write("typo.txt", "qwzx blorp\n");

    sandbox
        .cmd()
        .args(["check", "--no-color"])
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_installed_dictionary_is_used() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();
    let aff = sandbox.write("words.aff", "REP 1\nREP f ph\n");
    let file = sandbox.write("typo.txt", "hello wrold\n");

    sandbox
        .cmd()
        .args(["dict", "install", "en_TEST", "--dic"])
        .arg(&dic)
        .arg("--aff")
        .arg(&aff)
        .assert()
        .success();

    let assert = sandbox
        .cmd()
        .args(["--no-color", "dict", "list"])
        .assert()
        .success();
    assert!(stdout_of(&assert).contains("en_TEST"));

    sandbox
        .cmd()
        .args(["check", "--no-color", "-l", "en_TEST"])
        .arg(&file)
        .assert()
        .code(1);
}

#[test]
fn test_suggest_command() {
    let sandbox = Sandbox::new();
    let dic = sandbox.words();

    let assert = sandbox
        .cmd()
        .args(["suggest", "--no-color", "--dic"])
        .arg(&dic)
        .args(["wrold", "qqqqqqqq"])
        .assert()
        .success();

    let stdout = stdout_of(&assert);
    assert!(stdout.contains("wrold → world"));
    assert!(stdout.contains("qqqqqqqq (no suggestions)"));
}

#[test]
fn test_serve_speaks_json_lines() {
    let sandbox = Sandbox::new();
    let input = [
        r#"{"type":"INIT_DICTIONARY","affixRules":"","wordList":"hello\nworld"}"#,
        r#"{"type":"CHECK_TEXT","fullText":"helo world"}"#,
        "not json",
        r#"{"type":"ADD_WORD","word":"helo"}"#,
        r#"{"type":"GET_CACHE_STATS"}"#,
    ]
    .join("\n");

    let assert = sandbox.cmd().arg("serve").write_stdin(input).assert().success();

    let responses: Vec<serde_json::Value> = stdout_of(&assert)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let types: Vec<&str> = responses
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();

    assert_eq!(
        types,
        vec![
            "DICTIONARY_READY",
            "CHECK_RESULT",
            "ERROR",
            "CHECK_RESULT",
            "DICTIONARY_UPDATED",
            "CACHE_STATS",
        ]
    );
    assert_eq!(responses[1]["invalidWords"][0]["word"], "helo");
    assert_eq!(responses[3]["invalidWords"].as_array().unwrap().len(), 0);
    assert_eq!(responses[5]["customWordsCount"], 1);
}

#[test]
fn test_serve_malformed_import_imports_nothing() {
    let sandbox = Sandbox::new();
    let input = [
        r#"{"type":"INIT_DICTIONARY","affixRules":"","wordList":"hello\nworld"}"#,
        r#"{"type":"IMPORT_WORDS","words":"{not a list"}"#,
        r#"{"type":"IMPORT_WORDS","words":{"words":["helo"]}}"#,
        r#"{"type":"CHECK_TEXT","fullText":"helo"}"#,
    ]
    .join("\n");

    let assert = sandbox.cmd().arg("serve").write_stdin(input).assert().success();

    let responses: Vec<serde_json::Value> = stdout_of(&assert)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 4);
    for response in &responses[1..3] {
        assert_eq!(
            response,
            &serde_json::json!({"type": "WORDS_IMPORTED", "imported": 0, "failed": []})
        );
    }
    assert_eq!(responses[3]["invalidWords"][0]["word"], "helo");
}

#[test]
fn test_completion_script() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .cmd()
        .args(["--completion", "bash"])
        .assert()
        .success();

    assert!(stdout_of(&assert).contains("spellflow"));
}
