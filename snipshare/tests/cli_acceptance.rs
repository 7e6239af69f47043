use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Nothing listens here; network calls fail fast.
const DEAD_API: &str = "http://127.0.0.1:9/api/snippets";

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    work: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let work = base.join("work");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        for dir in [&home, &work, &xdg_data, &xdg_config, &xdg_state] {
            fs::create_dir_all(dir).expect("failed to create test directory");
        }

        Self {
            _temp_dir: temp_dir,
            home,
            work,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn sessions_dir(&self) -> PathBuf {
        self.xdg_state.join("snipshare/sessions")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(assert_cmd::cargo::cargo_bin!("snipshare"));
        command
            .args(args)
            .current_dir(&self.work)
            .env("HOME", &self.home)
            .env("XDG_DATA_HOME", &self.xdg_data)
            .env("XDG_CONFIG_HOME", &self.xdg_config)
            .env("XDG_STATE_HOME", &self.xdg_state)
            .env("SNIPSHARE_API_URL", DEAD_API)
            .env_remove("SNIPSHARE_SESSION")
            .env_remove("RUST_LOG");
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .unwrap_or_else(|e| panic!("failed to execute snipshare: {e}"))
    }

    fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap_or_else(|e| panic!("failed to spawn snipshare: {e}"));
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("failed to write stdin");
        child.wait_with_output().expect("failed to wait for snipshare")
    }
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "snipshare {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn status_reports_fallback_api() {
    let env = CliTestEnv::new();

    let output = env
        .command(&["status", "--json"])
        .env_remove("SNIPSHARE_API_URL")
        .output()
        .expect("failed to execute snipshare");
    assert_success(&["status", "--json"], &output);

    assert!(stderr(&output).contains("Using fallback API URL"));
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("status --json should print JSON");
    assert_eq!(report["api_source"], "fallback");
    assert_eq!(report["session"], "default");
    assert_eq!(report["history_entries"], 0);
}

#[test]
fn draft_persists_between_invocations() {
    let env = CliTestEnv::new();

    let args = [
        "draft", "set", "--content", "hello world", "--title", "Greeting", "--tags", "a, ,b",
        "--expire", "3600",
    ];
    let output = env.run(&args);
    assert_success(&args, &output);

    let output = env.run(&["draft", "show"]);
    assert_success(&["draft", "show"], &output);
    let shown = stdout(&output);
    assert!(shown.contains("Greeting"));
    assert!(shown.contains("a, b"));
    assert!(shown.contains("1 hour"));
    assert!(shown.contains("hello world"));
    assert!(shown.contains("2 words"));
}

#[test]
fn clear_needs_confirmation() {
    let env = CliTestEnv::new();
    assert_success(&[], &env.run(&["draft", "set", "--content", "keep me"]));

    let refused = env.run(&["draft", "clear"]);
    assert!(!refused.status.success());
    assert!(stderr(&refused).contains("--yes"));
    assert!(stdout(&env.run(&["draft", "show"])).contains("keep me"));

    let cleared = env.run(&["draft", "clear", "--yes"]);
    assert_success(&["draft", "clear", "--yes"], &cleared);
    assert!(stdout(&cleared).contains("Content and files cleared"));
    assert!(stdout(&env.run(&["draft", "show"])).contains("(empty)"));
}

#[test]
fn empty_save_is_rejected_locally() {
    let env = CliTestEnv::new();

    let output = env.run(&["save"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("[error] Content or files cannot be empty."));
}

#[test]
fn save_failure_keeps_the_draft() {
    let env = CliTestEnv::new();
    assert_success(&[], &env.run(&["draft", "set", "--content", "unsaved work"]));

    let output = env.run(&["save"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Failed to save snippet. Please try again."));
    assert!(stdout(&env.run(&["draft", "show"])).contains("unsaved work"));
}

#[test]
fn import_format_export_round() {
    let env = CliTestEnv::new();
    let source = env.home.join("config.json");
    fs::write(&source, "{\"a\":1}").expect("failed to write fixture");
    let source_arg = source.to_string_lossy().into_owned();

    let output = env.run(&["draft", "import", &source_arg]);
    assert_success(&["draft", "import"], &output);
    assert!(stdout(&output).contains("File \"config.json\" loaded. Language set to json"));

    assert_success(&["draft", "format"], &env.run(&["draft", "format"]));

    let output = env.run(&["draft", "export"]);
    assert_success(&["draft", "export"], &output);
    let exported = env.work.join("config.json");
    assert!(stdout(&output).contains("config.json"));
    assert_eq!(
        fs::read_to_string(exported).expect("export should exist"),
        "{\n  \"a\": 1\n}"
    );
}

#[test]
fn replace_reports_count() {
    let env = CliTestEnv::new();
    assert_success(&[], &env.run(&["draft", "set", "--content", "Foo foo FOO"]));

    let output = env.run(&["draft", "replace", "foo", "bar"]);
    assert_success(&["draft", "replace"], &output);
    assert!(stdout(&output).contains("Replaced 3 occurrences"));
    assert!(stdout(&env.run(&["draft", "show"])).contains("bar bar bar"));
}

#[test]
fn prefs_validate_and_persist() {
    let env = CliTestEnv::new();

    let bad = env.run(&["prefs", "--font-size", "13"]);
    assert!(!bad.status.success());

    let args = ["prefs", "--font-size", "16", "--theme", "dark", "--autosave", "on"];
    assert_success(&args, &env.run(&args));

    let output = env.run(&["prefs"]);
    assert_success(&["prefs"], &output);
    let shown = stdout(&output);
    assert!(shown.contains("Font size: 16"));
    assert!(shown.contains("Theme:     dark"));
    assert!(shown.contains("Autosave:  on"));
}

#[test]
fn ai_preconditions_and_detection_fallback() {
    let env = CliTestEnv::new();
    assert_success(
        &[],
        &env.run(&["draft", "set", "--content", "def foo():\n    pass", "--text"]),
    );

    let analyze = env.run(&["ai", "analyze"]);
    assert!(!analyze.status.success());
    assert!(stdout(&analyze).contains("Please enter code to analyze"));

    let args = ["ai", "detect", "--apply"];
    let detect = env.run(&args);
    assert_success(&args, &detect);
    let out = stdout(&detect);
    assert!(out.contains("python (heuristic)"));
    assert!(out.contains("Applied language: python"));
    assert!(stdout(&env.run(&["draft", "show"])).contains("code (python)"));
}

#[test]
fn history_starts_empty() {
    let env = CliTestEnv::new();
    let output = env.run(&["history"]);
    assert_success(&["history"], &output);
    assert!(stdout(&output).contains("No snippets in this session."));
}

#[test]
fn shell_supports_undo() {
    let env = CliTestEnv::new();

    let output = env.run_with_stdin(&["shell"], "set first\nset second\nundo\nshow\nquit\n");
    assert_success(&["shell"], &output);
    let out = stdout(&output);
    assert!(out.contains("first"));
    assert!(!out.contains("second"));

    // The restored content is what survives the session.
    assert!(stdout(&env.run(&["draft", "show"])).contains("first"));
}

#[test]
fn fresh_shell_leaves_no_partition_behind() {
    let env = CliTestEnv::new();

    let output = env.run_with_stdin(&["shell", "--fresh"], "help\n");
    assert_success(&["shell", "--fresh"], &output);
    assert!(stdout(&output).contains("snipshare shell (session 'tmp-"));

    let leftovers: Vec<_> = fs::read_dir(env.sessions_dir())
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("tmp-"))
                .collect()
        })
        .unwrap_or_default();
    assert!(leftovers.is_empty(), "throwaway partition should be removed");
}
