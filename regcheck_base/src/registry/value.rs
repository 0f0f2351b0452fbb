//! Registry value data and its uniform string form

use std::fmt;

/// Typed registry value as returned by a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    None,
    String(String),
    ExpandString(String),
    MultiString(Vec<String>),
    Dword(u32),
    Qword(u64),
    Binary(Vec<u8>),
}

impl RegistryValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            RegistryValue::None => "REG_NONE",
            RegistryValue::String(_) => "REG_SZ",
            RegistryValue::ExpandString(_) => "REG_EXPAND_SZ",
            RegistryValue::MultiString(_) => "REG_MULTI_SZ",
            RegistryValue::Dword(_) => "REG_DWORD",
            RegistryValue::Qword(_) => "REG_QWORD",
            RegistryValue::Binary(_) => "REG_BINARY",
        }
    }
}

/// Uniform text used for comparison: strings verbatim, integers in decimal,
/// multi-strings joined with `,`, binary as lowercase hex
impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryValue::None => Ok(()),
            RegistryValue::String(s) | RegistryValue::ExpandString(s) => f.write_str(s),
            RegistryValue::MultiString(items) => f.write_str(&items.join(",")),
            RegistryValue::Dword(n) => write!(f, "{}", n),
            RegistryValue::Qword(n) => write!(f, "{}", n),
            RegistryValue::Binary(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringification() {
        assert_eq!(RegistryValue::Dword(1).to_string(), "1");
        assert_eq!(RegistryValue::Qword(4294967296).to_string(), "4294967296");
        assert_eq!(
            RegistryValue::MultiString(vec!["a".into(), "b".into()]).to_string(),
            "a,b"
        );
        assert_eq!(RegistryValue::Binary(vec![0x0a, 0xff]).to_string(), "0aff");
        assert_eq!(
            RegistryValue::ExpandString("%SystemRoot%".into()).to_string(),
            "%SystemRoot%"
        );
        assert_eq!(RegistryValue::None.to_string(), "");
    }
}
