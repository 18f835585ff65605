use std::fmt::Display;

use derive_more::{Deref, From, Into};
use pbxproj::{Dictionary, Value};
use uuid::Uuid;

/// Length of the identifiers Xcode uses as object keys.
const ID_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From, Into)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Generates a random identifier in the same shape Xcode uses: 24
    /// uppercase hexadecimal characters.
    pub fn generate() -> Self {
        let mut buf = Uuid::encode_buffer();
        let encoded = Uuid::new_v4().simple().encode_upper(&mut buf);
        Self(encoded[..ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(String::from(s))
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.0)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `isa` tag of an object record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Isa {
    BuildFile,
    FileReference,
    Group,
    NativeTarget,
    Project,
    SourcesBuildPhase,
    VariantGroup,
    Other(String),
}

impl Isa {
    pub fn as_str(&self) -> &str {
        match self {
            Isa::BuildFile => "PBXBuildFile",
            Isa::FileReference => "PBXFileReference",
            Isa::Group => "PBXGroup",
            Isa::NativeTarget => "PBXNativeTarget",
            Isa::Project => "PBXProject",
            Isa::SourcesBuildPhase => "PBXSourcesBuildPhase",
            Isa::VariantGroup => "PBXVariantGroup",
            Isa::Other(other) => other,
        }
    }

    /// Groups are the only records that stand for folders in the navigator.
    pub fn is_group(&self) -> bool {
        matches!(self, Isa::Group | Isa::VariantGroup)
    }
}

impl From<&str> for Isa {
    fn from(s: &str) -> Self {
        match s {
            "PBXBuildFile" => Isa::BuildFile,
            "PBXFileReference" => Isa::FileReference,
            "PBXGroup" => Isa::Group,
            "PBXNativeTarget" => Isa::NativeTarget,
            "PBXProject" => Isa::Project,
            "PBXSourcesBuildPhase" => Isa::SourcesBuildPhase,
            "PBXVariantGroup" => Isa::VariantGroup,
            other => Isa::Other(String::from(other)),
        }
    }
}

impl From<Isa> for Value {
    fn from(isa: Isa) -> Self {
        Value::from(isa.as_str())
    }
}

impl Display for Isa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A read-only view of one record in the object store.
#[derive(Debug, Clone, Copy)]
pub struct Object<'a> {
    id: &'a str,
    record: &'a Dictionary,
}

impl<'a> Object<'a> {
    pub(crate) fn new(id: &'a str, record: &'a Dictionary) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::from(self.id)
    }

    /// The record's type tag. Records without one are reported as an empty
    /// `Other`.
    pub fn isa(&self) -> Isa {
        Isa::from(self.string("isa").unwrap_or_default())
    }

    pub fn is_group(&self) -> bool {
        self.isa().is_group()
    }

    pub fn name(&self) -> Option<&'a str> {
        self.string("name")
    }

    pub fn path(&self) -> Option<&'a str> {
        self.string("path")
    }

    /// True if either the `name` or the `path` of the record is `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.path() == Some(label) || self.name() == Some(label)
    }

    /// What Xcode would show for the record: its path, falling back to its
    /// name.
    pub fn label(&self) -> Option<&'a str> {
        self.path().or_else(|| self.name())
    }

    pub fn string(&self, key: &str) -> Option<&'a str> {
        self.record.get_str(key)
    }

    /// Identifiers listed under `key`. A missing key reads as an empty list;
    /// non-string entries are ignored.
    pub fn references(&self, key: &str) -> Vec<ObjectId> {
        self.record
            .get(key)
            .and_then(Value::as_array)
            .map(|array| {
                array
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ObjectId::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn children(&self) -> Vec<ObjectId> {
        self.references("children")
    }
}
