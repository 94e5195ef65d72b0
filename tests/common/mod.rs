//! Common test helpers for integration tests
//!
//! `FakeEngines` lays out a throwaway resource directory whose bundled runtime
//! is `/bin/sh` and whose engine entry points are shell scripts honouring the
//! engines' argv/stdin/stdout contract. Every script records what it saw in a
//! log directory so tests can assert on it afterwards.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;
use texnel::channel::{EventSink, PushEvent};
use texnel::utils::AppConfig;

/// Scan engine stand-in
///
/// The file name decides the behaviour:
/// - contains `flagged`: two detections, reported with alias keys
/// - contains `crash`: stderr plus exit code 3
/// - contains `garbage`: non-JSON stdout
/// - contains `silent`: no stdout at all
/// - contains `unsupported`: an engine-reported error
/// - contains `hang`: sleeps long enough to hit a timeout
/// - anything else: no detections
const SCANNER: &str = r#"
token="$1"
path="${token%%::*}"
name="${token#*::}"
echo "$path" >> "__LOG__/seen_paths.log"
echo "$name" >> "__LOG__/seen_names.log"
printf '%s' "$PYTHONIOENCODING" > "__LOG__/encoding.log"
printf '%s' "$DETECT_VERBOSE" > "__LOG__/verbose.log"

if [ ! -f "$path" ]; then
  echo "staged file missing: $path" >&2
  exit 9
fi

case "$name" in
  *crash*)
    echo "detector exploded on $name" >&2
    exit 3
    ;;
  *garbage*)
    echo "Traceback (most recent call last):"
    ;;
  *silent*)
    ;;
  *unsupported*)
    printf '{"filename":"%s","detections":[],"error":"unsupported_extension"}' "$name"
    ;;
  *hang*)
    sleep 5
    ;;
  *flagged*)
    printf '{"filename":"%s","has_detection":true,"detections":[{"category":"eps","match":"%%!PS exec","message":"PostScript payload"},{"id":"7","type":"ole","key":"Package","intent":"embedded object"}]}' "$name"
    ;;
  *)
    printf '{"filename":"%s","detections":[]}' "$name"
    ;;
esac
"#;

/// Sanitize engine stand-in
///
/// Writes `<in>.sanitized` next to its input. An input whose path contains
/// `no-output` gets a reply without `outPath`; `fail-sanitize` exits 2.
const SANITIZER: &str = r#"
printf '%s\n' "$@" > "__LOG__/sanitize_args.log"
cat > "__LOG__/sanitize_stdin.json"

in="$2"
case "$in" in
  *fail-sanitize*)
    echo "cleaner failed" >&2
    exit 2
    ;;
  *no-output*)
    printf '{"patched":true}'
    exit 0
    ;;
esac

cp "$in" "$in.sanitized"
printf '{"outPath":"%s","patched":1,"report":[{"id":1,"action":"masked"}]}' "$in.sanitized"
"#;

pub struct FakeEngines {
    /// Temporary directory (kept alive until drop)
    #[allow(dead_code)]
    temp_dir: TempDir,
    pub resource_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl FakeEngines {
    pub fn install() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let resource_dir = root.join("resources");
        let staging_dir = root.join("staging");
        let log_dir = root.join("logs");

        for dir in [&staging_dir, &log_dir] {
            fs::create_dir_all(dir).expect("create dir");
        }

        let runtime = texnel::engine::resolver::bundled_runtime_path(&resource_dir);
        fs::create_dir_all(runtime.parent().expect("runtime parent")).expect("runtime dir");
        // A symlink is never open for writing, so exec can't hit ETXTBSY
        #[cfg(unix)]
        std::os::unix::fs::symlink("/bin/sh", &runtime).expect("runtime symlink");

        let log = log_dir.to_string_lossy().into_owned();
        write_script(&resource_dir, &["detect_core", "file_scanner.py"], &SCANNER.replace("__LOG__", &log));
        write_script(&resource_dir, &["llm_cleaner", "ai_cleaner.py"], &SANITIZER.replace("__LOG__", &log));

        Self {
            temp_dir,
            resource_dir,
            staging_dir,
            log_dir,
        }
    }

    /// Configuration pointing at the fake engines, with override variables
    /// that are never set
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::new(&self.resource_dir).with_staging_dir(&self.staging_dir);
        config.primary_runtime_var = "TEXNEL_IT_UNSET_PRIMARY".to_string();
        config.secondary_runtime_var = "TEXNEL_IT_UNSET_SECONDARY".to_string();
        config
    }

    pub fn read_log(&self, name: &str) -> String {
        fs::read_to_string(self.log_dir.join(name)).unwrap_or_default()
    }

    /// Staged paths the scan engine was handed, in call order
    pub fn seen_paths(&self) -> Vec<PathBuf> {
        self.read_log("seen_paths.log")
            .lines()
            .map(PathBuf::from)
            .collect()
    }

    /// Original names the scan engine was handed, in call order
    pub fn seen_names(&self) -> Vec<String> {
        self.read_log("seen_names.log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Staged uploads still present in the staging directory
    pub fn staged_leftovers(&self) -> Vec<PathBuf> {
        fs::read_dir(&self.staging_dir)
            .expect("read staging dir")
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                name.starts_with("texnel_") && !name.ends_with(".sanitized")
            })
            .collect()
    }

    /// Create a file outside the staging directory, as a persisted upload
    pub fn persisted_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let dir = self.temp_dir.path().join("persisted");
        fs::create_dir_all(&dir).expect("persisted dir");
        let path = dir.join(name);
        fs::write(&path, contents).expect("persisted file");
        path
    }
}

fn write_script(resource_dir: &Path, parts: &[&str], body: &str) {
    let path = parts.iter().fold(resource_dir.to_path_buf(), |p, part| p.join(part));
    fs::create_dir_all(path.parent().expect("script parent")).expect("script dir");
    fs::write(&path, body).expect("write script");
}

/// Sink that records every push event in order
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PushEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<PushEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PushEvent) -> Result<(), String> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Sink whose transport breaks after `accept` deliveries
pub struct BrokenSink {
    accept: usize,
    inner: RecordingSink,
}

impl BrokenSink {
    pub fn after(accept: usize) -> Self {
        Self {
            accept,
            inner: RecordingSink::default(),
        }
    }

    pub fn events(&self) -> Vec<PushEvent> {
        self.inner.events()
    }
}

impl EventSink for BrokenSink {
    fn emit(&self, event: PushEvent) -> Result<(), String> {
        if self.inner.events.lock().unwrap().len() >= self.accept {
            return Err("webview is gone".to_string());
        }
        self.inner.emit(event)
    }
}
