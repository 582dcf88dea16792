//! End-to-end pipeline tests driving the compiled binary.
//!
//! Assertions are file-system only: artifact presence and content, never
//! console output.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn gantry() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gantry"))
}

/// Conventional project layout with valid sources and marked-up output.
fn project_fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("src/assets/css")).unwrap();
    fs::create_dir_all(root.join("src/assets/js")).unwrap();
    fs::create_dir_all(root.join("src/assets/vendor/css")).unwrap();
    fs::create_dir_all(root.join("dist")).unwrap();

    fs::write(root.join("gantry.toml"), "").unwrap();
    fs::write(
        root.join("src/assets/css/main.css"),
        ".card { color: red; user-select: none; }",
    )
    .unwrap();
    fs::write(
        root.join("src/assets/js/app.js"),
        "const double = (n) => n * 2;\n\
         //removeIf(production)\n\
         console.log('debug-only-marker');\n\
         //endRemoveIf(production)\n\
         console.log(double(21));\n",
    )
    .unwrap();
    fs::write(
        root.join("src/assets/vendor/css/reset.css"),
        ".card { color: blue; margin: 0; }",
    )
    .unwrap();
    fs::write(
        root.join("dist/index.html"),
        "<html><head>\n\
         <!-- build:css -->\n\
         <link rel=\"stylesheet\" href=\"assets/css/main.css\">\n\
         <!-- endbuild -->\n\
         </head><body>\n\
         <!-- build:js -->\n\
         <script src=\"assets/js/app.js\"></script>\n\
         <!-- endbuild -->\n\
         </body></html>",
    )
    .unwrap();

    temp
}

fn run(root: &Path, args: &[&str]) -> std::process::ExitStatus {
    let config = root.join("gantry.toml");
    gantry()
        .arg("-C")
        .arg(&config)
        .args(args)
        .status()
        .expect("failed to spawn gantry")
}

#[test]
fn production_build_writes_all_artifacts() {
    let temp = project_fixture();
    let root = temp.path();

    let status = run(root, &["build", "--preview=false"]);
    assert!(status.success());

    // Compiled artifacts with source maps
    assert!(root.join("dist/assets/css/main.css").is_file());
    assert!(root.join("dist/assets/css/main.css.map").is_file());
    assert!(root.join("dist/assets/js/app.js").is_file());

    // Minified bundles
    let min_css = fs::read_to_string(root.join("dist/assets/css/main.min.css")).unwrap();
    let min_js = fs::read_to_string(root.join("dist/assets/js/app.min.js")).unwrap();

    // Application rules win over vendor rules for the same selector
    let vendor_pos = min_css.find("color:blue");
    let app_pos = min_css.find("color:red").expect("app rule present");
    if let Some(vendor_pos) = vendor_pos {
        assert!(vendor_pos < app_pos);
    }

    // Production-removal block stripped before minification
    assert!(!min_js.contains("debug-only-marker"));

    // Markup references the minified bundles, markers consumed
    let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
    assert!(html.contains("assets/css/main.min.css"));
    assert!(html.contains("assets/js/app.js"));
    assert!(!html.contains("build:css"));
    assert!(!html.contains("endbuild"));
}

#[test]
fn second_build_leaves_rewritten_markup_unchanged() {
    let temp = project_fixture();
    let root = temp.path();

    assert!(run(root, &["build", "--preview=false"]).success());
    let first = fs::read_to_string(root.join("dist/index.html")).unwrap();

    assert!(run(root, &["build", "--preview=false"]).success());
    let second = fs::read_to_string(root.join("dist/index.html")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn lint_exit_codes_follow_style_verdict() {
    let temp = project_fixture();
    let root = temp.path();

    assert!(run(root, &["lint"]).success());

    // One !important violation flips the whole task to failure.
    fs::write(
        root.join("src/assets/css/shame.css"),
        ".card { color: green !important; }",
    )
    .unwrap();
    assert!(!run(root, &["lint"]).success());
}

#[test]
fn script_diagnostics_never_fail_the_lint_task() {
    let temp = project_fixture();
    let root = temp.path();

    fs::write(root.join("src/assets/js/extra.js"), "function ( {").unwrap();
    assert!(run(root, &["lint"]).success());
}
