//! Native Windows registry source
//!
//! Opens keys read-only in the 64-bit view and decodes raw value data into
//! [`RegistryValue`]. Each query opens and closes its own handle, so the
//! source holds no OS state and can be shared across worker threads.

use regcheck_base::registry::{QueryFailure, RegistryPath, RegistrySource, RegistryValue, RootKey};
use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_PATH_NOT_FOUND,
    ERROR_SUCCESS, WIN32_ERROR,
};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_CLASSES_ROOT, HKEY_CURRENT_USER,
    HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_READ, KEY_WOW64_64KEY, REG_DWORD,
    REG_EXPAND_SZ, REG_MULTI_SZ, REG_NONE, REG_QWORD, REG_SZ, REG_VALUE_TYPE,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    pub fn new() -> Self {
        Self
    }
}

/// Open key, closed on drop
struct KeyHandle(HKEY);

impl KeyHandle {
    fn open(path: &RegistryPath) -> Result<Self, QueryFailure> {
        let sub_key = wide(&path.sub_key);
        let mut handle: HKEY = ptr::null_mut();

        let status = unsafe {
            RegOpenKeyExW(
                root_handle(path.root),
                sub_key.as_ptr(),
                0,
                KEY_READ | KEY_WOW64_64KEY,
                &mut handle,
            )
        };

        if status == ERROR_SUCCESS {
            Ok(Self(handle))
        } else {
            Err(failure(status))
        }
    }

    fn query(&self, value_name: &str) -> Result<RegistryValue, QueryFailure> {
        let name = wide(value_name);
        let mut value_type: REG_VALUE_TYPE = REG_NONE;
        let mut size: u32 = 0;

        let status = unsafe {
            RegQueryValueExW(
                self.0,
                name.as_ptr(),
                ptr::null(),
                &mut value_type,
                ptr::null_mut(),
                &mut size,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(failure(status));
        }

        // The value can grow between the size query and the read
        loop {
            let mut data = vec![0u8; size as usize];
            let status = unsafe {
                RegQueryValueExW(
                    self.0,
                    name.as_ptr(),
                    ptr::null(),
                    &mut value_type,
                    data.as_mut_ptr(),
                    &mut size,
                )
            };

            match status {
                ERROR_SUCCESS => {
                    data.truncate(size as usize);
                    return Ok(decode(value_type, data));
                }
                ERROR_MORE_DATA => continue,
                other => return Err(failure(other)),
            }
        }
    }
}

impl Drop for KeyHandle {
    fn drop(&mut self) {
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

impl RegistrySource for WindowsRegistry {
    fn query_value(
        &self,
        path: &RegistryPath,
        value_name: &str,
    ) -> Result<RegistryValue, QueryFailure> {
        KeyHandle::open(path)?.query(value_name)
    }

    fn key_exists(&self, path: &RegistryPath) -> Result<bool, QueryFailure> {
        match KeyHandle::open(path) {
            Ok(_) => Ok(true),
            Err(QueryFailure::NotFound) => Ok(false),
            Err(other) => Err(other),
        }
    }

    fn source_id(&self) -> &str {
        "windows"
    }
}

fn root_handle(root: RootKey) -> HKEY {
    match root {
        RootKey::LocalMachine => HKEY_LOCAL_MACHINE,
        RootKey::CurrentUser => HKEY_CURRENT_USER,
        RootKey::Users => HKEY_USERS,
        RootKey::ClassesRoot => HKEY_CLASSES_ROOT,
    }
}

fn failure(status: WIN32_ERROR) -> QueryFailure {
    match status {
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => QueryFailure::NotFound,
        ERROR_ACCESS_DENIED => QueryFailure::PermissionDenied,
        other => QueryFailure::Platform(io::Error::from_raw_os_error(other as i32).to_string()),
    }
}

/// Null-terminated UTF-16
fn wide(text: &str) -> Vec<u16> {
    OsStr::new(text).encode_wide().chain(Some(0)).collect()
}

fn decode(value_type: REG_VALUE_TYPE, data: Vec<u8>) -> RegistryValue {
    match value_type {
        REG_NONE => RegistryValue::None,
        REG_SZ => RegistryValue::String(utf16_string(&data)),
        REG_EXPAND_SZ => RegistryValue::ExpandString(utf16_string(&data)),
        REG_MULTI_SZ => RegistryValue::MultiString(
            utf16_units(&data)
                .split(|&unit| unit == 0)
                .filter(|item| !item.is_empty())
                .map(String::from_utf16_lossy)
                .collect(),
        ),
        REG_DWORD if data.len() >= 4 => {
            RegistryValue::Dword(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
        }
        REG_QWORD if data.len() >= 8 => {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&data[..8]);
            RegistryValue::Qword(u64::from_le_bytes(bytes))
        }
        // Anything else keeps its raw bytes
        _ => RegistryValue::Binary(data),
    }
}

fn utf16_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Decode REG_SZ data, which may or may not carry its terminator
fn utf16_string(data: &[u8]) -> String {
    let units = utf16_units(data);
    let end = units.iter().position(|&unit| unit == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> Vec<u8> {
        text.encode_utf16().chain(Some(0)).flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn test_decode_strings() {
        assert_eq!(decode(REG_SZ, encode("on")), RegistryValue::String("on".into()));
        assert_eq!(
            decode(REG_EXPAND_SZ, encode("%SystemRoot%")),
            RegistryValue::ExpandString("%SystemRoot%".into())
        );

        let mut multi = encode("a");
        multi.extend(encode("b"));
        multi.extend([0, 0]);
        assert_eq!(
            decode(REG_MULTI_SZ, multi),
            RegistryValue::MultiString(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode(REG_DWORD, 7u32.to_le_bytes().to_vec()), RegistryValue::Dword(7));
        assert_eq!(
            decode(REG_QWORD, (1u64 << 40).to_le_bytes().to_vec()),
            RegistryValue::Qword(1 << 40)
        );
        assert_eq!(decode(REG_DWORD, vec![1]), RegistryValue::Binary(vec![1]));
    }

    #[test]
    fn test_missing_value_is_not_found() {
        let registry = WindowsRegistry::new();
        let path = RegistryPath::new(RootKey::LocalMachine, "Software\\regcheck-does-not-exist");

        assert_eq!(registry.query_value(&path, "X"), Err(QueryFailure::NotFound));
        assert_eq!(registry.key_exists(&path), Ok(false));
    }

    #[test]
    fn test_reads_known_value() {
        let registry = WindowsRegistry::new();
        let path = RegistryPath::new(
            RootKey::LocalMachine,
            "SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion",
        );

        assert_eq!(registry.key_exists(&path), Ok(true));
        assert!(matches!(
            registry.query_value(&path, "CurrentBuild"),
            Ok(RegistryValue::String(_))
        ));
    }
}
