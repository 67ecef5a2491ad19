use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn doodlepad_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("doodlepad").expect("binary exists");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG");
    cmd
}

const STROKE_SCRIPT: &str = r##"# one red stroke across the middle
{"event":"set_style","color":"#ff0000","width":10}
{"event":"pointer_down","x":45,"y":65}
{"event":"pointer_move","x":145,"y":65}
{"event":"pointer_up"}
"##;

fn write_fixture(temp: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let config_path = temp.path().join("doodlepad.toml");
    std::fs::write(
        &config_path,
        format!(
            "[canvas]\nwidth = 200\nheight = 120\n\n[session]\nstorage = \"config\"\n\n[export]\ndirectory = \"{}\"\nfilename_template = \"drawing\"\n",
            temp.path().join("exports").display()
        ),
    )
    .unwrap();

    let script_path = temp.path().join("stroke.jsonl");
    std::fs::write(&script_path, STROKE_SCRIPT).unwrap();
    (config_path, script_path)
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    doodlepad_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Freehand raster drawing surface with pan/zoom and undo/redo",
        ))
        .stdout(predicate::str::contains("--replay"));
}

#[test]
fn no_arguments_prints_quick_usage() {
    let temp = TempDir::new().unwrap();
    doodlepad_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--session-info"));
}

#[test]
fn replay_and_export_png() {
    let temp = TempDir::new().unwrap();
    let (config_path, script_path) = write_fixture(&temp);

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--replay")
        .arg(&script_path)
        .arg("--export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 4 event(s)"))
        .stdout(predicate::str::contains("drawing.png"));

    let exported = std::fs::read(temp.path().join("exports").join("drawing.png")).unwrap();
    assert_eq!(&exported[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn replay_and_export_jpeg_to_explicit_path() {
    let temp = TempDir::new().unwrap();
    let (config_path, script_path) = write_fixture(&temp);
    let output = temp.path().join("out.jpg");

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--replay")
        .arg(&script_path)
        .args(["--format", "jpeg", "--quality", "80", "--output"])
        .arg(&output)
        .assert()
        .success();

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn unsupported_format_fails() {
    let temp = TempDir::new().unwrap();
    let (config_path, _) = write_fixture(&temp);
    let output = temp.path().join("out.gif");

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .args(["--format", "gif", "--output"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported export format 'gif'"));
    assert!(!output.exists());
}

#[test]
fn invalid_quality_fails() {
    let temp = TempDir::new().unwrap();
    let (config_path, _) = write_fixture(&temp);

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .args(["--format", "jpeg", "--quality", "0", "--output"])
        .arg(temp.path().join("out.jpg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn save_then_inspect_and_clear_session() {
    let temp = TempDir::new().unwrap();
    let (config_path, script_path) = write_fixture(&temp);

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--replay")
        .arg(&script_path)
        .arg("--save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Canvas saved"));

    assert!(temp.path().join("saved-canvas.snapshot").exists());

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--session-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Canvas:    200x120"));

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--clear-session")
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot file removed: yes"));

    assert!(!temp.path().join("saved-canvas.snapshot").exists());

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--session-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));
}

#[test]
fn bad_replay_script_reports_line() {
    let temp = TempDir::new().unwrap();
    let (config_path, _) = write_fixture(&temp);
    let script = temp.path().join("bad.jsonl");
    std::fs::write(&script, "{\"event\":\"undo\"}\n{\"event\":\"teleport\"}\n").unwrap();

    doodlepad_cmd(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("--replay")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn session_info_conflicts_with_replay() {
    let temp = TempDir::new().unwrap();
    doodlepad_cmd(temp.path())
        .args(["--session-info", "--replay", "x.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
