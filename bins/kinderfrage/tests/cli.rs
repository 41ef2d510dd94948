use assert_cmd::Command;
use predicates::prelude::*;

const CORPUS: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../crates/search/tests/fixtures/corpus.json"
);

fn kinderfrage() -> Command {
    let mut cmd = Command::cargo_bin("kinderfrage").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn sanitize_prints_cleaned_query() {
    kinderfrage()
        .args(["sanitize", "  Kind   weint & "])
        .assert()
        .success()
        .stdout("Kind weint\n");
}

#[test]
fn sanitize_reports_rejection() {
    kinderfrage()
        .args(["sanitize", "<>"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(rejected)"));
}

#[test]
fn preprocess_keeps_negation() {
    kinderfrage()
        .args(["preprocess", "Mein Baby schläft nicht"])
        .assert()
        .success()
        .stdout("baby schläft nicht\n");
}

#[test]
fn search_lists_best_match_first() {
    kinderfrage()
        .args(["search", "mein Kind weint", "--corpus", CORPUS])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(" 1. [q1]"));
}

#[test]
fn search_json_output() {
    kinderfrage()
        .args(["search", "zahnen", "--corpus", CORPUS, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "q6""#));
}

#[test]
fn diagnostics_counts_skipped_entries() {
    kinderfrage()
        .args(["diagnostics", "--corpus", CORPUS, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""skipped_records": 3"#))
        .stdout(predicate::str::contains(r#""init_status": "ready""#));
}

#[test]
fn missing_corpus_fails_with_code() {
    kinderfrage()
        .args(["search", "fieber", "--corpus", "/no/such/corpus.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn missing_config_fails_with_code() {
    kinderfrage()
        .args(["--config", "/no/such/kinderfrage.toml", "sanitize", "fieber"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"));
}

#[test]
fn interactive_session() {
    kinderfrage()
        .args(["interactive", "--corpus", CORPUS])
        .write_stdin("fieber\n:stats\n:reset\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[q4]"))
        .stdout(predicate::str::contains("search.requests"))
        .stdout(predicate::str::contains("Session state cleared"));
}
