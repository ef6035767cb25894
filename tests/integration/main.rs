//! Integration tests for console-sources

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn console_sources() -> Command {
        Command::cargo_bin("console-sources").unwrap()
    }

    /// A zip shaped like a GitHub release archive: one top-level folder
    /// wrapping the sources.
    fn write_release_zip(path: &std::path::Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer
            .add_directory("api-console-5.0.0/", options)
            .unwrap();
        writer
            .start_file("api-console-5.0.0/api-console.html", options)
            .unwrap();
        writer.write_all(b"<html></html>").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn help_displays() {
        console_sources()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Stage API Console sources"));
    }

    #[test]
    fn version_displays() {
        console_sources()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("console-sources"));
    }

    #[test]
    fn destination_is_required() {
        console_sources().assert().failure();
    }

    #[test]
    fn tag_and_src_conflict() {
        console_sources()
            .args(["--tag", "v5.0.0", "--src", "local", "build"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }

    #[test]
    fn bad_repo_slug_fails() {
        console_sources()
            .args(["--repo", "not-a-slug", "build"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("owner/repo"));
    }

    #[test]
    fn stages_local_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("console");
        std::fs::create_dir_all(src.join("assets")).unwrap();
        std::fs::write(src.join("api-console.html"), "<html></html>").unwrap();
        std::fs::write(src.join("assets").join("app.js"), "window").unwrap();

        let dest = temp.path().join("build");
        console_sources()
            .args(["--src", src.to_str().unwrap(), dest.to_str().unwrap()])
            .assert()
            .success();

        assert!(dest.join("api-console.html").is_file());
        assert!(dest.join("assets").join("app.js").is_file());
    }

    #[test]
    fn stages_local_zip_with_collapse() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("test.zip");
        write_release_zip(&zip_path);

        let dest = temp.path().join("build");
        console_sources()
            .args(["--src", zip_path.to_str().unwrap(), dest.to_str().unwrap()])
            .assert()
            .success();

        // The wrapping folder is collapsed into the destination root
        assert!(dest.join("api-console.html").is_file());
    }

    #[test]
    fn missing_local_source_reports_error() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("build");
        console_sources()
            .args(["--src", "no/such/path", dest.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }
}
