use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    base: PathBuf,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            base,
            home,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("calendar-heatmap");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }

    fn log_dir(&self) -> PathBuf {
        self.xdg_state.join("calendar-heatmap")
    }
}

fn fixture_path() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../calendar-heatmap-core/tests/fixtures/two-years.json")
        .to_string_lossy()
        .into_owned()
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("calendar-heatmap"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute calendar-heatmap: {e}"))
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
        "calendar-heatmap {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn renders_global_overview_as_svg_to_stdout() {
    let env = CliTestEnv::new();
    let data = fixture_path();
    let args = ["--data", data.as_str(), "--seed", "3"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<svg"), "expected svg, got:\n{stdout}");
    assert_eq!(stdout.matches("item-block-year").count(), 2);
    assert!(stdout.contains(">2023</text>"));
    assert!(stdout.contains(">2024</text>"));
}

#[test]
fn writes_html_page_to_output_file() {
    let env = CliTestEnv::new();
    let data = fixture_path();
    let target = env.base.join("heatmap.html");
    let target = target.to_string_lossy().into_owned();
    let args = [
        "--data",
        data.as_str(),
        "--format",
        "html",
        "--output",
        target.as_str(),
    ];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    assert!(output.stdout.is_empty());

    let html = fs::read_to_string(&target).expect("output file should exist");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(".calendar-heatmap .heatmap-tooltip"));
    assert!(html.contains(r#"<div class="heatmap-tooltip""#));
}

#[test]
fn year_overview_anchors_on_today() {
    let env = CliTestEnv::new();
    let data = fixture_path();
    let args = [
        "--data",
        data.as_str(),
        "--overview",
        "year",
        "--today",
        "2024-04-10",
        "--color",
        "#1e90ff",
    ];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("item-circle").count(), 4);
    assert!(stdout.contains("label-month"));
    assert!(stdout.contains("button-back"));
}

#[test]
fn invalid_color_is_rejected() {
    let env = CliTestEnv::new();
    let data = fixture_path();

    let output = run_bin(&env, &["--data", data.as_str(), "--color", "orange"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid color"), "stderr:\n{stderr}");
}

#[test]
fn missing_dataset_is_reported() {
    let env = CliTestEnv::new();
    let missing = env.base.join("nope.json");
    let missing = missing.to_string_lossy().into_owned();

    let output = run_bin(&env, &["--data", missing.as_str()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read dataset"), "stderr:\n{stderr}");
}

#[test]
fn empty_dataset_warns_on_stderr() {
    let env = CliTestEnv::new();
    let data = env.base.join("empty.json");
    fs::write(&data, "[]").expect("failed to write dataset");
    let data = data.to_string_lossy().into_owned();
    let args = ["--data", data.as_str()];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<svg"));
    assert!(!stdout.contains("item-block-year"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Dataset has no records"), "stderr:\n{stderr}");
    assert!(!stderr.contains("Logging initialized"));
}

#[test]
fn config_file_sets_initial_overview() {
    let env = CliTestEnv::new();
    env.write_config(
        r##"
[heatmap]
overview = "month"
color = "#2e8b57"
"##,
    );
    let data = fixture_path();
    let args = ["--data", data.as_str(), "--today", "2024-03-20"];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("item-block-month").count(), 3);
    assert!(stdout.contains("label-week"));
}

#[test]
fn invalid_config_fails_before_rendering() {
    let env = CliTestEnv::new();
    env.write_config(
        r#"
[heatmap]
overview = "decade"
"#,
    );
    let data = fixture_path();

    let output = run_bin(&env, &["--data", data.as_str()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn log_file_is_written_to_state_dir() {
    let env = CliTestEnv::new();
    let data = fixture_path();
    let args = ["--data", data.as_str()];

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let entries: Vec<_> = fs::read_dir(env.log_dir())
        .expect("log dir should exist")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        entries.iter().any(|name| name.starts_with("calendar-heatmap.log")),
        "expected a log file, found {:?}",
        entries
    );
}
