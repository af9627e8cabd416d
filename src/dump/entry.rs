use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::trace::CallSite;

/// A value that can be shown in the panel
///
/// Implemented for every `Serialize` type, so `dump(my_struct.clone())` or
/// `dump(vec![1, 2])` just work. Values that are only `Debug` can be wrapped
/// in [`Debugged`].
pub trait DumpValue: Send + Sync {
    /// Declared Rust type name of the value.
    fn type_name(&self) -> &'static str;

    /// Structured form of the value handed to the serializer.
    fn to_json(&self) -> Result<Value, serde_json::Error>;
}

impl<T> DumpValue for T
where
    T: Serialize + Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Wrapper dumping a value through its `Debug` representation.
pub struct Debugged<T>(pub T);

impl<T> Serialize for Debugged<T>
where
    T: fmt::Debug,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#?}", self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Debugged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// One dumped value with its labels
///
/// Entries are created by the registry and never modified afterwards; the
/// value is shared so snapshots taken for rendering are cheap.
#[derive(Clone)]
pub struct DumpEntry {
    value: Arc<dyn DumpValue>,
    title: Option<String>,
    call_site: CallSite,
}

impl DumpEntry {
    pub fn new(value: Arc<dyn DumpValue>, title: Option<String>, call_site: CallSite) -> Self {
        Self {
            value,
            title,
            call_site,
        }
    }

    pub fn value(&self) -> &dyn DumpValue {
        self.value.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn source_file(&self) -> Option<&str> {
        self.call_site.file.as_deref()
    }

    pub fn source_line(&self) -> Option<u32> {
        self.call_site.line
    }

    pub fn caller_class(&self) -> Option<&str> {
        self.call_site.class.as_deref()
    }

    pub fn caller_function(&self) -> Option<&str> {
        self.call_site.function.as_deref()
    }
}

impl fmt::Debug for DumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpEntry")
            .field("type", &self.value.type_name())
            .field("title", &self.title)
            .field("call_site", &self.call_site)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_values_report_their_type() {
        let v: Arc<dyn DumpValue> = Arc::new(vec![1u8, 2]);
        assert_eq!(v.type_name(), "alloc::vec::Vec<u8>");
        assert_eq!(v.to_json().unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_cloned_struct_is_dumpable() {
        #[derive(Clone, Serialize)]
        struct Pool {
            open: u32,
        }
        let pool = Pool { open: 4 };
        let v: Arc<dyn DumpValue> = Arc::new(pool.clone());
        assert_eq!(v.to_json().unwrap(), json!({"open": 4}));
    }

    #[test]
    fn test_debugged_uses_pretty_debug() {
        #[derive(Debug)]
        struct Opaque {
            id: u32,
        }
        let v = Debugged(Opaque { id: 7 });
        let json = DumpValue::to_json(&v).unwrap();
        assert_eq!(json, json!("Opaque {\n    id: 7,\n}"));
    }

    #[test]
    fn test_entry_accessors() {
        let entry = DumpEntry::new(
            Arc::new("x"),
            Some("T".to_string()),
            CallSite {
                file: Some("src/lib.rs".to_string()),
                line: Some(3),
                class: Some("app".to_string()),
                function: Some("index".to_string()),
            },
        );
        assert_eq!(entry.title(), Some("T"));
        assert_eq!(entry.source_file(), Some("src/lib.rs"));
        assert_eq!(entry.source_line(), Some(3));
        assert_eq!(entry.caller_class(), Some("app"));
        assert_eq!(entry.caller_function(), Some("index"));
        assert_eq!(entry.value().type_name(), "&str");
    }
}
