use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const CLASSIC_TSX: &str = include_str!("../assets/tileset_classic.tsx");
const CLASSIC_TMX: &str = include_str!("../assets/classic.tmx");

fn tsxkit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsxkit"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn validate_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("classic.tsx"), CLASSIC_TSX).unwrap();
    let duplicated = CLASSIC_TSX.replace("<tile id=\"4\"", "<tile id=\"3\"");
    fs::write(dir.path().join("duplicated.tsx"), duplicated).unwrap();

    let output = tsxkit(dir.path(), &["validate", "classic.tsx"]);
    assert!(output.status.success());
    assert_eq!("classic.tsx: ok\n", stdout(&output));

    // One broken file fails the whole run
    let output = tsxkit(dir.path(), &["validate", "classic.tsx", "duplicated.tsx"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("duplicated.tsx: error: duplicate tile id 3"));

    // Warnings alone don't
    fs::write(dir.path().join("strict.yaml"), "strict: true\nproperty_types: []\n").unwrap();
    let output = tsxkit(dir.path(), &["validate", "--config", "strict.yaml", "classic.tsx"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("classic.tsx: warning: tile 0 property 'blocking' is not declared"));

    // tsxkit.yaml is picked up from the working directory
    fs::write(dir.path().join("tsxkit.yaml"), "strict: true\nproperty_types: []\n").unwrap();
    let output = tsxkit(dir.path(), &["validate", "classic.tsx"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("warning"));

    let output = tsxkit(dir.path(), &["validate", "missing.tsx"]);
    assert!(!output.status.success());
}

#[test]
fn convert_to_export_target() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = dir.path().join("sheets");
    fs::create_dir(&sheets).unwrap();
    fs::write(sheets.join("classic.tsx"), CLASSIC_TSX).unwrap();

    let output = tsxkit(dir.path(), &["convert", "sheets/classic.tsx"]);
    assert!(output.status.success());
    let exported = fs::read_to_string(sheets.join("tileset_classic.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!("tileset", json["type"]);

    // Output extension picks the format
    let output = tsxkit(dir.path(), &["convert", "sheets/tileset_classic.json", "back.tsx"]);
    assert!(output.status.success());
    let back = fs::read_to_string(dir.path().join("back.tsx")).unwrap();
    assert!(back.starts_with("<?xml"));

    let output = tsxkit(dir.path(), &["convert", "back.tsx", "back.txt"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("back.txt").exists());
}

#[test]
fn map_prints_blocking_cells() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tileset_classic.tsx"), CLASSIC_TSX).unwrap();
    fs::write(dir.path().join("classic.tmx"), CLASSIC_TMX).unwrap();

    let output = tsxkit(dir.path(), &["map", "classic.tmx"]);
    assert!(output.status.success());
    let expected = "\
Classic
7x5
#######
#..%..#
#.#%#.#
#.....#
#######
";
    assert_eq!(expected, stdout(&output));
}
