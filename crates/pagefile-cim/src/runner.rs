//! Script execution and response decoding.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use pagefile_wmi::{AutomationError, AutomationResult};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::script;

/// Executes a PowerShell script and returns its standard output.
pub trait ScriptRunner {
    fn run(&self, operation: &str, script: &str) -> AutomationResult<String>;
}

/// Runs scripts through a Windows PowerShell interpreter.
#[derive(Debug, Clone)]
pub struct PowerShell {
    executable: PathBuf,
}

impl PowerShell {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl ScriptRunner for PowerShell {
    fn run(&self, operation: &str, script: &str) -> AutomationResult<String> {
        trace!(operation, script, "Running CIM script");
        let output = Command::new(&self.executable)
            .args([
                "-NoLogo",
                "-NoProfile",
                "-NonInteractive",
                "-ExecutionPolicy",
                "Bypass",
                "-EncodedCommand",
            ])
            .arg(script::encode(script))
            .output()
            .map_err(|e| AutomationError::io(format!("{operation}: start {}", self.executable.display()), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() && last_line(&stdout).is_none() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            return Err(AutomationError::call(operation, extract_hresult(message), message));
        }
        debug!(operation, status = ?output.status.code(), "CIM script finished");
        Ok(stdout)
    }
}

/// Locate the interpreter once.
///
/// An explicitly configured path wins. Otherwise a 32-bit process on a 64-bit
/// host must go through `sysnative` to reach the native interpreter, so that
/// candidate is tried before `System32`.
pub fn resolve_interpreter(
    configured: Option<&Path>,
    windows_dir: Option<&Path>,
    exists: impl Fn(&Path) -> bool,
) -> AutomationResult<PathBuf> {
    if let Some(path) = configured {
        return if exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(AutomationError::unsupported(format!(
                "configured PowerShell interpreter {} does not exist",
                path.display()
            )))
        };
    }

    let windows_dir = windows_dir
        .ok_or_else(|| AutomationError::unsupported("cannot locate the Windows directory (WINDIR is not set)"))?;
    ["sysnative", "System32"]
        .iter()
        .map(|dir| {
            windows_dir
                .join(dir)
                .join("WindowsPowerShell")
                .join("v1.0")
                .join("powershell.exe")
        })
        .find(|candidate| exists(candidate))
        .ok_or_else(|| {
            AutomationError::unsupported(format!(
                "no PowerShell interpreter found under {}",
                windows_dir.display()
            ))
        })
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

fn last_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).rfind(|line| !line.is_empty())
}

/// Decode the envelope printed by a wrapped script.
pub fn decode(operation: &str, stdout: &str) -> AutomationResult<Value> {
    let line = last_line(stdout)
        .ok_or_else(|| AutomationError::parse(format!("{operation}: no output")))?;
    let envelope: Envelope = serde_json::from_str(line)
        .map_err(|e| AutomationError::parse(format!("{operation}: {e}: {line}")))?;
    if envelope.ok {
        return Ok(envelope.data);
    }
    let message = envelope.message.unwrap_or_default();
    let code = envelope
        .code
        .and_then(hresult_from_i64)
        .or_else(|| extract_hresult(&message));
    Err(AutomationError::call(operation, code, message))
}

// .NET reports HRESULTs as signed 32-bit integers.
fn hresult_from_i64(value: i64) -> Option<u32> {
    if value == 0 {
        return None;
    }
    i32::try_from(value)
        .map(|v| v as u32)
        .or_else(|_| u32::try_from(value))
        .ok()
}

/// Find an HRESULT spelled as `0x8004....` in free text.
pub fn extract_hresult(text: &str) -> Option<u32> {
    static HRESULT: OnceLock<Regex> = OnceLock::new();
    let re = HRESULT.get_or_init(|| Regex::new(r"0[xX]([0-9A-Fa-f]{8})").expect("valid HRESULT pattern"));
    re.captures(text)
        .and_then(|c| u32::from_str_radix(&c[1], 16).ok())
}
