//! Extended file attributes as expression values.

use std::path::Path;

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    /// Seconds since the Unix epoch.
    Time(i64),
    String(String),
    /// Bytes of a type with no text form.
    Raw(Vec<u8>),
}

impl AttributeValue {
    /// Text substituted for the value in a target name.
    pub fn render(&self) -> String {
        match self {
            Self::Int8(v) => v.to_string(),
            Self::UInt8(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::UInt16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::UInt32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::UInt64(v) => v.to_string(),
            Self::Float(v) => format!("{v:.6}"),
            Self::Double(v) => format!("{v:.6}"),
            Self::Bool(v) => u8::from(*v).to_string(),
            Self::Time(seconds) => chrono::DateTime::from_timestamp(*seconds, 0)
                .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            Self::String(text) => match text.find('\0') {
                Some(end) => text[..end].to_string(),
                None => text.clone(),
            },
            Self::Raw(_) => String::new(),
        }
    }
}

/// Reads named attributes of file system entries.
pub trait AttributeSource: Send + Sync {
    /// Returns `None` when the entry or the attribute cannot be read.
    fn read(&self, path: &Path, name: &str) -> Option<AttributeValue>;
}

/// Reads extended attributes (`user.*` on Linux) as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct XattrSource;

impl AttributeSource for XattrSource {
    fn read(&self, path: &Path, name: &str) -> Option<AttributeValue> {
        let bytes = read_xattr(path, name)?;
        Some(AttributeValue::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    }
}

#[cfg(unix)]
fn read_xattr(path: &Path, name: &str) -> Option<Vec<u8>> {
    match xattr::get(path, xattr_name(name)) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("reading xattr {name:?} of {}: {e}", path.display());
            None
        }
    }
}

#[cfg(not(unix))]
fn read_xattr(_path: &Path, _name: &str) -> Option<Vec<u8>> {
    None
}

#[cfg(target_os = "linux")]
fn xattr_name(name: &str) -> String {
    if name.contains('.') {
        name.to_string()
    } else {
        format!("user.{name}")
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
fn xattr_name(name: &str) -> String {
    name.to_string()
}
