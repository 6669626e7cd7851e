use std::fs;
use std::os::unix::fs::PermissionsExt;

use tempfile::TempDir;

/// A platform cli stand-in that records its arguments and stores `env add` input per key.
pub struct FakeTool {
    pub path: String,
    dir: TempDir,
}

impl FakeTool {
    // fail_on makes every invocation whose arguments contain it exit 1, after recording
    pub fn new(fail_on: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let fail = match fail_on {
            Some(pattern) => format!("case \"$*\" in *\"{pattern}\"*) exit 1;; esac\n"),
            None => String::new(),
        };
        let script = format!(
            r#"#!/bin/sh
dir=$(dirname "$0")
printf '%s\n' "$*" >> "$dir/calls.log"
if [ "$1" = env ] && [ "$2" = add ]; then
  cat > "$dir/stored_$3"
fi
{fail}exit 0
"#
        );
        let path = dir.path().join("platform");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        FakeTool {
            path: path.to_string_lossy().to_string(),
            dir,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn stored(&self, key: &str) -> Vec<u8> {
        fs::read(self.dir.path().join(format!("stored_{key}"))).unwrap()
    }
}
