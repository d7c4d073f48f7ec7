use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_tower-defense"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch the tower-defense binary");
    assert!(
        output.status.success(),
        "tower-defense {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn exported_save(output: &Output) -> String {
    String::from_utf8(output.stdout.clone())
        .expect("stdout is utf-8")
        .trim()
        .to_owned()
}

#[test]
fn exported_save_imports_into_a_fresh_process() {
    let first = run(&[
        "--seconds",
        "0",
        "--place",
        "basic@100,150",
        "--place",
        "basic@300,200",
        "--export-save",
    ]);
    let save = exported_save(&first);
    assert!(save.starts_with("td:v1:"), "unexpected export: {save}");

    let second = run(&["--seconds", "0", "--import-save", &save, "--export-save"]);

    assert_eq!(exported_save(&second), save);
}

#[test]
fn malformed_import_fails_the_run() {
    let output = Command::new(env!("CARGO_BIN_EXE_tower-defense"))
        .args(["--seconds", "0", "--import-save", "layout:v1:e30"])
        .output()
        .expect("failed to launch the tower-defense binary");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
