#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Test context holding stub tool scripts and a call log they append to.
struct TestContext {
    temp: TempDir,
}

/// Stub resolver: probes succeed (or exit `$STUB_PROBE_EXIT`), the XML
/// selection prints a minimal selections document, `run ... gather`
/// populates its output directory, everything logs to `$STUB_LOG`.
const RESOLVER_STUB: &str = r#"#!/bin/sh
if [ -n "$STUB_LOG" ]; then
  echo "$@" >> "$STUB_LOG"
  echo "XDG=$XDG_DATA_DIRS" >> "$STUB_LOG"
fi
case "$1" in
  select)
    want_xml=0
    for a in "$@"; do
      if [ "$a" = "--xml" ]; then want_xml=1; fi
    done
    if [ "$want_xml" -eq 1 ]; then
      printf "<?xml version='1.0' ?>\n<selections/>\n"
      exit 0
    fi
    exit "${STUB_PROBE_EXIT:-0}"
    ;;
  download)
    exit 0
    ;;
  run)
    out=""
    prev=""
    mode=""
    for a in "$@"; do
      case "$a" in
        gather) mode=gather ;;
        autocompile) mode=compile ;;
      esac
      if [ "$prev" = "--output" ]; then out="$a"; fi
      prev="$a"
    done
    if [ "$mode" = "gather" ]; then
      mkdir -p "$out/left-pad"
      echo "module.exports = {}" > "$out/left-pad/index.js"
    fi
    exit 0
    ;;
esac
exit 1
"#;

/// Stub archiver speaking the two verbs the pipeline uses.
const ARCHIVER_STUB: &str = r#"#!/bin/sh
case "$1" in
  xzvf)
    mkdir -p "$4/xdg-data/feeds"
    echo unpacked > "$4/xdg-data/feeds/marker"
    exit 0
    ;;
  czf)
    echo tarball > "$2"
    exit 0
    ;;
esac
exit 1
"#;

impl TestContext {
    fn new() -> Self {
        Self {
            temp: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn stub(&self, name: &str, body: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, body).expect("failed to write stub");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    fn log_path(&self) -> PathBuf {
        self.temp.path().join("stub.log")
    }

    fn log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    fn zibundle(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_zibundle"));
        cmd.env("STUB_LOG", self.log_path());
        cmd
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx
        .zibundle()
        .arg("--help")
        .output()
        .expect("failed to run zibundle");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .zibundle()
        .arg("--version")
        .output()
        .expect("failed to run zibundle");
    assert!(output.status.success());
}

#[test]
fn test_no_dependencies_is_an_error() {
    let ctx = TestContext::new();
    let output = ctx
        .zibundle()
        .arg("--runtime-version")
        .arg("8.0.0")
        .output()
        .expect("failed to run zibundle");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no dependencies"));
}

#[test]
fn test_missing_runtime_version_is_an_error() {
    let ctx = TestContext::new();
    let output = ctx
        .zibundle()
        .arg("left-pad@1.0.0")
        .output()
        .expect("failed to run zibundle");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("runtime version"));
}

#[cfg(unix)]
#[test]
fn test_bundle_with_stub_tools() {
    let ctx = TestContext::new();
    let resolver = ctx.stub("0install-stub", RESOLVER_STUB);
    let archiver = ctx.stub("archiver-stub", ARCHIVER_STUB);
    let dest = ctx.temp.path().join("out");
    fs::create_dir(&dest).unwrap();

    let output = ctx
        .zibundle()
        .args(["left-pad@1.0.0", "chalk@2.3.0"])
        .args(["--runtime-version", "8.0.0"])
        .arg("--resolver-cmd")
        .arg(&resolver)
        .arg("--archiver-cmd")
        .arg(&archiver)
        .arg("--dest")
        .arg(&dest)
        .output()
        .expect("failed to run zibundle");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    let bundle = dest.join("deps.tar.gz");
    assert!(bundle.exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&bundle.display().to_string()));

    // Both probes ran, in order, and the compile pass never did.
    let log = ctx.log();
    let probes: Vec<&str> = log
        .lines()
        .filter(|l| l.starts_with("select --version"))
        .collect();
    assert_eq!(probes.len(), 2);
    assert!(probes[0].contains("left-pad.xml"));
    assert!(probes[1].contains("chalk.xml"));
    assert!(!log.contains("autocompile"));
    assert!(log.contains("gather"));
}

#[cfg(unix)]
#[test]
fn test_probe_failure_stops_probing_and_compiles() {
    let ctx = TestContext::new();
    let resolver = ctx.stub("0install-stub", RESOLVER_STUB);
    let archiver = ctx.stub("archiver-stub", ARCHIVER_STUB);

    let output = ctx
        .zibundle()
        .env("STUB_PROBE_EXIT", "1")
        .args(["left-pad@1.0.0", "chalk@2.3.0"])
        .args(["--runtime-version", "8.0.0"])
        .arg("--resolver-cmd")
        .arg(&resolver)
        .arg("--archiver-cmd")
        .arg(&archiver)
        .output()
        .expect("failed to run zibundle");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    let log = ctx.log();
    // First probe fails; chalk is never probed on this platform.
    let probes: Vec<&str> = log
        .lines()
        .filter(|l| l.starts_with("select --version"))
        .collect();
    assert_eq!(probes.len(), 1);
    assert!(probes[0].contains("left-pad.xml"));
    // The compile pass ran before the selection export.
    let compile_at = log.find("autocompile").unwrap();
    let export_at = log.find("--xml").unwrap();
    assert!(compile_at < export_at);
}

#[cfg(unix)]
#[test]
fn test_override_archive_heads_the_data_dir_search_path() {
    let ctx = TestContext::new();
    let resolver = ctx.stub("0install-stub", RESOLVER_STUB);
    let archiver = ctx.stub("archiver-stub", ARCHIVER_STUB);
    let override_tar = ctx.temp.path().join("override.tar.gz");
    fs::write(&override_tar, b"ignored by the stub").unwrap();

    let output = ctx
        .zibundle()
        .arg("left-pad@1.0.0")
        .args(["--runtime-version", "8.0.0"])
        .arg("--override-tar")
        .arg(&override_tar)
        .arg("--resolver-cmd")
        .arg(&resolver)
        .arg("--archiver-cmd")
        .arg(&archiver)
        .output()
        .expect("failed to run zibundle");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    let log = ctx.log();
    let xdg = log
        .lines()
        .find(|l| l.starts_with("XDG=") && l.len() > 4)
        .expect("no data-dir overlay recorded");
    assert!(xdg.contains("/xdg-data:"), "overlay was: {xdg}");
}

#[cfg(unix)]
#[test]
fn test_manifest_driven_run() {
    let ctx = TestContext::new();
    let resolver = ctx.stub("0install-stub", RESOLVER_STUB);
    let archiver = ctx.stub("archiver-stub", ARCHIVER_STUB);
    let dest = ctx.temp.path().join("out");
    fs::create_dir(&dest).unwrap();

    let manifest = ctx.temp.path().join("zibundle.toml");
    fs::write(
        &manifest,
        format!(
            r#"
dependencies = ["left-pad@1.0.0"]
runtime-version = "8.0.0"
dest = "{}"
resolver-cmd = ["{}"]
archiver-cmd = ["{}"]
"#,
            dest.display(),
            resolver.display(),
            archiver.display()
        ),
    )
    .unwrap();

    let output = ctx
        .zibundle()
        .arg("--manifest")
        .arg(&manifest)
        .output()
        .expect("failed to run zibundle");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(dest.join("deps.tar.gz").exists());
}

/// Full round trip against the system `tar` as the archiver: the
/// override archive is a real tarball built here, and the produced
/// bundle is opened and inspected. Skipped when `tar` is unavailable.
#[cfg(unix)]
#[test]
fn test_real_archiver_round_trip() {
    let tar_ok = Command::new("tar")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !tar_ok {
        eprintln!("skipping: no system tar");
        return;
    }

    let ctx = TestContext::new();
    let resolver = ctx.stub("0install-stub", RESOLVER_STUB);
    let dest = ctx.temp.path().join("out");
    fs::create_dir(&dest).unwrap();

    // Build a real override archive: xdg-data/feeds/left-pad.xml
    let override_tar = ctx.temp.path().join("override.tar.gz");
    {
        let file = fs::File::create(&override_tar).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let feed_dir = ctx.temp.path().join("fixture/xdg-data/feeds");
        fs::create_dir_all(&feed_dir).unwrap();
        fs::write(feed_dir.join("left-pad.xml"), "<interface/>").unwrap();
        builder
            .append_dir_all("xdg-data", ctx.temp.path().join("fixture/xdg-data"))
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    let output = ctx
        .zibundle()
        .arg("left-pad@1.0.0")
        .args(["--runtime-version", "8.0.0"])
        .arg("--override-tar")
        .arg(&override_tar)
        .arg("--resolver-cmd")
        .arg(&resolver)
        .args(["--archiver-cmd", "tar"])
        .arg("--dest")
        .arg(&dest)
        .output()
        .expect("failed to run zibundle");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    // Open the produced bundle and check its contents.
    let bundle = dest.join("deps.tar.gz");
    let file = fs::File::open(&bundle).unwrap();
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    let mut saw_selections = false;
    let mut saw_gathered = false;
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let path = entry.path().unwrap().display().to_string();
        if path.ends_with("selections.xml") {
            use std::io::Read;
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            assert_eq!(content, "<?xml version='1.0' ?>\n<selections/>\n");
            saw_selections = true;
        }
        if path.starts_with("left-pad") {
            saw_gathered = true;
        }
    }
    assert!(saw_selections, "bundle is missing the selections document");
    assert!(saw_gathered, "bundle is missing the gathered package");
}
