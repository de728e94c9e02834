use std::fs;
use std::process::Command;
use tempfile::TempDir;

const CATALOG: &str = r#"{
    "projects": [{
        "id": "1",
        "locales": ["en", "fr", "de"],
        "terms": [
            { "value": "menu.open", "translations": [
                { "locale": "en", "value": "Open" },
                { "locale": "fr", "value": "Ouvrir" }
            ]},
            { "value": "menu.close", "translations": [
                { "locale": "en", "value": "Close" }
            ]}
        ]
    }]
}"#;

fn langpush_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("langpush"))
}

fn write_catalog(temp_dir: &TempDir) -> String {
    let path = temp_dir.path().join("catalog.json");
    fs::write(&path, CATALOG).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_formats_lists_every_format() {
    let output = langpush_cmd().arg("formats").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.contains("jsonnested"));
    assert!(stdout.contains("application/x-xliff+xml"));
    assert!(stdout.contains(".resx"));
}

#[test]
fn test_export_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog(&temp_dir);

    let output = langpush_cmd()
        .args([
            "export", "--catalog", &catalog, "-p", "1", "-l", "fr", "-f", "properties",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "menu.close=\nmenu.open=Ouvrir\n"
    );
}

#[test]
fn test_export_untranslated_with_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog(&temp_dir);
    let output_file = temp_dir.path().join("fr.csv");

    let output = langpush_cmd()
        .args([
            "export",
            "--catalog",
            &catalog,
            "--project",
            "1",
            "--locale",
            "fr",
            "--format",
            "csv",
            "--untranslated",
            "-o",
            output_file.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&output_file).unwrap(),
        "term,translation\nmenu.close,\n"
    );
}

#[test]
fn test_export_all_locales_into_directory() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog(&temp_dir);
    let out_dir = temp_dir.path().join("public");

    let output = langpush_cmd()
        .args([
            "export",
            "--catalog",
            &catalog,
            "-p",
            "1",
            "-l",
            "all",
            "-f",
            "jsonflat",
            "--fallback-locale",
            "en",
            "--out-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 pushed in total."));

    let de = fs::read_to_string(out_dir.join("site_1/locale/de.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&de).unwrap();
    assert_eq!(json["menu.open"], "Open");
    assert_eq!(json["menu.close"], "Close");
}

#[test]
fn test_export_rejects_unknown_format() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog(&temp_dir);

    let output = langpush_cmd()
        .args(["export", "--catalog", &catalog, "-p", "1", "-l", "fr", "-f", "docx"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported format"));
}

#[test]
fn test_export_unknown_locale_fails() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog(&temp_dir);

    let output = langpush_cmd()
        .args(["export", "--catalog", &catalog, "-p", "1", "-l", "ja", "-f", "csv"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: not found"));
}
