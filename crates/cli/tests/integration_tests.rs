//! End-to-end tests driving the `cli` binary as a subprocess over stdin/stdout.
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Spawns the CLI against `dir`, feeds it `command` on stdin, and returns its
/// captured stdout.
fn run_cli_command(dir: &Path, command: &str) -> String {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new("cargo")
        .args(["run", "-p", "cli", "--"])
        .env("CASK_DIR", dir.to_str().unwrap())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cli");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        stdin
            .write_all(command.as_bytes())
            .expect("failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("failed to write EXIT");
    }

    let output = child.wait_with_output().expect("failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_basic_set_get() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path()).unwrap();

    let output = run_cli_command(dir.path(), "SET key1 value1\nGET key1\n");

    assert!(output.contains("OK"));
    assert!(output.contains("value1"));
}

#[test]
fn test_multiple_keys() {
    let dir = tempdir().unwrap();

    let commands = "SET a 1\nSET b 2\nSET c 3\nGET a\nGET b\nGET c\n";
    let output = run_cli_command(dir.path(), commands);

    assert!(output.contains('1'));
    assert!(output.contains('2'));
    assert!(output.contains('3'));
}

#[test]
fn test_overwrite_key() {
    let dir = tempdir().unwrap();

    let commands = "SET mykey oldvalue\nGET mykey\nSET mykey newvalue\nGET mykey\n";
    let output = run_cli_command(dir.path(), commands);

    assert!(output.contains("oldvalue"));
    assert!(output.contains("newvalue"));
}

#[test]
fn test_delete_key() {
    let dir = tempdir().unwrap();

    let commands = "SET delme value\nGET delme\nDEL delme\nGET delme\n";
    let output = run_cli_command(dir.path(), commands);

    assert!(output.contains("value"));
    assert!(output.contains("(nil)"));
}

#[test]
fn test_flush_rotates_active_file() {
    let dir = tempdir().unwrap();

    let commands = "SET a 1\nSET b 2\nFLUSH\nGET a\nGET b\n";
    let output = run_cli_command(dir.path(), commands);

    assert!(output.contains("OK"));

    let data_files: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("data"))
        .collect();

    assert!(
        data_files.len() >= 2,
        "flushing should leave the retired file plus a fresh active file on disk"
    );
}

#[test]
fn test_persistence_across_restarts() {
    let dir = tempdir().unwrap();

    run_cli_command(dir.path(), "SET persist_key persist_value\nFLUSH\n");
    let output = run_cli_command(dir.path(), "GET persist_key\n");

    assert!(output.contains("persist_value"));
}

#[test]
fn test_missing_key_prints_nil() {
    let dir = tempdir().unwrap();

    let output = run_cli_command(dir.path(), "GET nope\n");
    assert!(output.contains("(nil)"));
}

#[test]
fn test_binary_data() {
    let dir = tempdir().unwrap();

    let commands =
        "SET KEY1 VALUE1\nSET Key2 Value2\nSET key3 value3\nGET KEY1\nGET Key2\nGET key3\n";
    let output = run_cli_command(dir.path(), commands);

    assert!(output.contains("VALUE1"));
    assert!(output.contains("Value2"));
    assert!(output.contains("value3"));
}

#[test]
fn test_large_value() {
    let dir = tempdir().unwrap();

    let large_value = "x".repeat(500);
    let commands = format!("SET large_key {large_value}\nGET large_key\n");
    let output = run_cli_command(dir.path(), &commands);

    assert!(output.contains('x'));
}

#[test]
fn test_sequential_get_after_multiple_operations() {
    let dir = tempdir().unwrap();

    let mut commands = String::new();
    for i in 0..20 {
        commands.push_str(&format!("SET seq_key{i:02} value{i}\n"));
    }
    for _ in 0..3 {
        commands.push_str("FLUSH\n");
    }
    for i in (0..20).step_by(2) {
        commands.push_str(&format!("SET seq_key{i:02} updated{i}\n"));
    }
    for i in 0..20 {
        commands.push_str(&format!("GET seq_key{i:02}\n"));
    }

    let output = run_cli_command(dir.path(), &commands);

    assert!(output.contains("updated0"));
    assert!(output.contains("value1"));
}

#[test]
fn test_stats_output() {
    let dir = tempdir().unwrap();

    let output = run_cli_command(dir.path(), "SET x 1\nSET y 2\nFLUSH\nSTATS\n");
    assert!(output.contains("Cask"));
}

#[test]
fn test_quit_command() {
    let dir = tempdir().unwrap();

    let commands = "SET foo bar\nQUIT\n";
    let output = run_cli_command(dir.path(), commands);

    assert!(output.contains("OK"));
    assert!(output.contains("bye"));
}

#[test]
fn test_mixed_operations_stress() {
    let dir = tempdir().unwrap();

    let mut commands = String::new();
    for i in 0..30 {
        match i % 4 {
            0 => commands.push_str(&format!("SET stress_k{i} stress_v{i}\n")),
            1 => commands.push_str(&format!("GET stress_k{i}\n")),
            2 => commands.push_str(&format!("DEL stress_k{}\n", (i as i32 - 2).max(0))),
            _ => commands.push_str("FLUSH\n"),
        }
    }

    let output = run_cli_command(dir.path(), &commands);

    assert!(!output.is_empty());
}
