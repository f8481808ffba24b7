//! Drives the built binary end to end.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn sift(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sift"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value { serde_json::from_slice(&output.stdout).unwrap() }

#[test]
fn test_fetch_keeps_one_file_per_content() {
    let mut server = mockito::Server::new();
    for (path, body) in [("/a.jpg", "X"), ("/b.jpg", "X"), ("/c.jpg", "Z")] {
        server.mock("GET", path).with_status(200).with_body(body).create();
    }
    server.mock("GET", "/gone.jpg").with_status(404).create();

    let dir = tempdir().unwrap();
    let base = server.url();
    let manifest = format!(
        "id,url\n1,{base}/a.jpg\n2,{base}/b.jpg\n3,{base}/c.jpg\n4,{base}/gone.jpg\n5,{base}/\n6,\n"
    );
    std::fs::write(dir.path().join("urls.csv"), manifest).unwrap();

    let output = sift(dir.path(), &["fetch", "urls.csv", "-o", "out", "-j", "2", "--json"]);
    assert!(!output.status.success(), "failed candidates give a failing exit code");

    let report = json(&output);
    assert_eq!(report["saved"], 2);
    assert_eq!(report["duplicate"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(report["failed"], 2);
    assert_eq!(report["not_started"], 0);

    let out = dir.path().join("out");
    let mut files: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| !name.starts_with('.'))
        .collect();
    files.sort();
    assert_eq!(files.len(), 2);
    assert!(files.contains(&"c.jpg".to_string()));
    assert_eq!(std::fs::read_dir(out.join(".staging")).unwrap().count(), 0);
}

#[test]
fn test_second_run_finds_everything_on_disk() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/a.jpg").with_status(200).with_body("A").create();

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("urls.csv"), format!("url\n{}/a.jpg\n", server.url())).unwrap();

    let first = sift(dir.path(), &["fetch", "urls.csv", "-o", "out", "--json"]);
    assert!(first.status.success());
    assert_eq!(json(&first)["saved"], 1);

    let second = sift(dir.path(), &["fetch", "urls.csv", "-o", "out", "--json"]);
    assert!(second.status.success());
    assert_eq!(json(&second)["duplicate"], 1);
    assert!(!dir.path().join("out/a-1.jpg").exists());
}

#[test]
fn test_config_file_sets_output_dir() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/p.png").with_status(200).with_body("P").create();
    server.mock("GET", "/q.gif").with_status(200).with_body("Q").create();

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("sift.toml"),
        "output_dir = \"plates\"\n[filter]\nextensions = [\"png\"]\n",
    )
    .unwrap();
    let base = server.url();
    std::fs::write(dir.path().join("urls.csv"), format!("url\n{base}/p.png\n{base}/q.gif\n")).unwrap();

    let output = sift(dir.path(), &["fetch", "urls.csv", "--json"]);
    assert!(output.status.success());

    let report = json(&output);
    assert_eq!(report["saved"], 1);
    assert_eq!(report["skipped"], 1);
    assert!(dir.path().join("plates/p.png").exists());
}

#[test]
fn test_scan_reports_redundant_files() {
    let dir = tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    std::fs::write(images.join("a.jpg"), b"same").unwrap();
    std::fs::write(images.join("b.jpg"), b"same").unwrap();
    std::fs::write(images.join("c.jpg"), b"other").unwrap();

    let output = sift(dir.path(), &["scan", "images", "--json"]);
    assert!(output.status.success());

    let report = json(&output);
    assert_eq!(report["scanned"], 3);
    assert_eq!(report["unique"], 2);
    assert_eq!(report["duplicates"][0]["path"], "images/b.jpg");
    assert_eq!(report["duplicates"][0]["duplicate_of"], "images/a.jpg");
}

#[test]
fn test_zero_concurrency_is_rejected() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("urls.csv"), "url\n").unwrap();

    let output = sift(dir.path(), &["fetch", "urls.csv", "-j", "0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("concurrency"));
}

#[test]
fn test_staging_in_output_dir_is_refused_and_files_survive() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/a.jpg").with_status(200).with_body("A").create();

    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    std::fs::write(out.join("keep.jpg"), "precious").unwrap();
    std::fs::write(dir.path().join("urls.csv"), format!("url\n{}/a.jpg\n", server.url())).unwrap();

    let output = sift(dir.path(), &["fetch", "urls.csv", "-o", "out", "--staging-dir", "out"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("staging directory"));
    assert_eq!(std::fs::read_to_string(out.join("keep.jpg")).unwrap(), "precious");
    assert!(!out.join("a.jpg").exists());
}

#[test]
fn test_stale_cleanup_only_touches_staged_files() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/a.jpg").with_status(200).with_body("A").create();

    let dir = tempdir().unwrap();
    let staging = dir.path().join("work");
    std::fs::create_dir(&staging).unwrap();
    std::fs::write(staging.join("notes.txt"), "mine").unwrap();
    let stale = staging.join(format!(".{}.a.jpg.part", "0".repeat(32)));
    std::fs::write(&stale, "half").unwrap();
    std::fs::write(dir.path().join("urls.csv"), format!("url\n{}/a.jpg\n", server.url())).unwrap();

    let output = sift(dir.path(), &["fetch", "urls.csv", "-o", "out", "--staging-dir", "work", "--json"]);
    assert!(output.status.success());
    assert_eq!(json(&output)["saved"], 1);

    assert!(!stale.exists());
    assert_eq!(std::fs::read_to_string(staging.join("notes.txt")).unwrap(), "mine");
}
