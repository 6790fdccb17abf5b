//! PowerShell scripts driving the CIM cmdlets.
//!
//! Every script is wrapped so that it prints exactly one JSON envelope on its
//! last output line: `{"ok":true,"data":...}` on success, or
//! `{"ok":false,"code":<HRESULT>,"message":"..."}` on failure.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use pagefile_wmi::{PageFileSetting, codes};

const PAGE_FILE_CLASS: &str = "Win32_PageFileSetting";
const COMPUTER_SYSTEM_CLASS: &str = "Win32_ComputerSystem";
const OPERATING_SYSTEM_CLASS: &str = "Win32_OperatingSystem";

/// Quote a value as a PowerShell single-quoted string literal.
pub fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escape a value for use inside a single-quoted WQL string literal.
pub fn wql_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn name_filter(name: &str) -> String {
    // The filter is itself a PowerShell single-quoted string.
    ps_quote(&format!("Name='{}'", wql_escape(name)))
}

/// Wrap a script body in the JSON envelope protocol.
///
/// The body reports its result by assigning `$data`, or flags a missing
/// instance by assigning its name to `$notFound`. CIM cmdlet failures carry
/// the WMI status in `ErrorData.error_Code`; the exception's own `HResult`
/// is only used when that is absent.
pub fn envelope(body: &str) -> String {
    let not_found = codes::WBEM_E_NOT_FOUND as i32;
    format!(
        r#"$ErrorActionPreference = 'Stop'
$ProgressPreference = 'SilentlyContinue'
$data = $null
$notFound = $null
try {{
{body}
}} catch {{
    $code = $_.Exception.HResult
    $errorData = $_.Exception.ErrorData
    if ($null -ne $errorData -and $null -ne $errorData.CimInstanceProperties['error_Code']) {{
        $code = [int64]$errorData.CimInstanceProperties['error_Code'].Value
    }}
    ConvertTo-Json -Compress -InputObject @{{ ok = $false; code = $code; message = $_.Exception.Message }}
    exit 0
}}
if ($null -ne $notFound) {{
    ConvertTo-Json -Compress -InputObject @{{ ok = $false; code = {not_found}; message = "$notFound not found" }}
}} else {{
    ConvertTo-Json -Compress -Depth 4 -InputObject @{{ ok = $true; data = $data }}
}}
"#
    )
}

pub fn query_page_files() -> String {
    envelope(&format!(
        "$data = @(Get-CimInstance -ClassName {PAGE_FILE_CLASS} | Select-Object Name, InitialSize, MaximumSize)"
    ))
}

pub fn spawn_page_file(name: &str) -> String {
    envelope(&format!(
        "New-CimInstance -ClassName {PAGE_FILE_CLASS} -Property @{{ Name = {} }} | Out-Null",
        ps_quote(name)
    ))
}

pub fn put_page_file(setting: &PageFileSetting) -> String {
    envelope(&format!(
        "$pf = Get-CimInstance -ClassName {PAGE_FILE_CLASS} -Filter {filter}
if ($null -eq $pf) {{ $notFound = {name} }} else {{
    $pf | Set-CimInstance -Property @{{ InitialSize = [uint32]{initial}; MaximumSize = [uint32]{maximum} }}
}}",
        filter = name_filter(&setting.name),
        name = ps_quote(&setting.name),
        initial = setting.initial_size,
        maximum = setting.maximum_size,
    ))
}

pub fn delete_page_file(name: &str) -> String {
    envelope(&format!(
        "$pf = Get-CimInstance -ClassName {PAGE_FILE_CLASS} -Filter {filter}
if ($null -eq $pf) {{ $notFound = {quoted} }} else {{ $pf | Remove-CimInstance }}",
        filter = name_filter(name),
        quoted = ps_quote(name),
    ))
}

pub fn automatic_managed() -> String {
    envelope(&format!(
        "$data = [bool](Get-CimInstance -ClassName {COMPUTER_SYSTEM_CLASS}).AutomaticManagedPageFile"
    ))
}

pub fn set_automatic_managed(enabled: bool) -> String {
    let flag = if enabled { "$true" } else { "$false" };
    envelope(&format!(
        "Get-CimInstance -ClassName {COMPUTER_SYSTEM_CLASS} | Set-CimInstance -Property @{{ AutomaticManagedPageFile = {flag} }}"
    ))
}

pub fn platform_release() -> String {
    envelope(&format!(
        "$data = [string](Get-CimInstance -ClassName {OPERATING_SYSTEM_CLASS}).Version"
    ))
}

/// Encode a script for `-EncodedCommand` (base64 of UTF-16LE).
pub fn encode(script: &str) -> String {
    let bytes: Vec<u8> = script.encode_utf16().flat_map(u16::to_le_bytes).collect();
    BASE64.encode(bytes)
}
