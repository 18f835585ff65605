//! Constructors for the records the synchroniser adds to a project.
//!
//! Keys are ordered the way Xcode orders them: `isa` first, then the rest
//! alphabetically.

use pbxproj::{Dictionary, Value};

use crate::{Isa, ObjectId};

const GROUP_SOURCE_TREE: &str = "<group>";

/// An empty group for a folder at `path`, relative to its parent group.
pub fn group(path: &str) -> Dictionary {
    let mut record = Dictionary::new();
    record.insert("isa", Isa::Group);
    record.insert("children", Value::Array(Vec::new()));
    record.insert("path", path);
    record.insert("sourceTree", GROUP_SOURCE_TREE);
    record
}

/// A reference to the file `path`, relative to its parent group.
pub fn file_reference(path: &str, file_type: &str) -> Dictionary {
    let mut record = Dictionary::new();
    record.insert("isa", Isa::FileReference);
    record.insert("lastKnownFileType", file_type);
    record.insert("path", path);
    record.insert("sourceTree", GROUP_SOURCE_TREE);
    record
}

/// A build file entry pointing at `file_ref`.
pub fn build_file(file_ref: &ObjectId) -> Dictionary {
    let mut record = Dictionary::new();
    record.insert("isa", Isa::BuildFile);
    record.insert("fileRef", file_ref.clone());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records() {
        let g = group("Models");
        assert_eq!(
            g.keys().collect::<Vec<_>>(),
            vec!["isa", "children", "path", "sourceTree"]
        );
        assert_eq!(g.get_str("path"), Some("Models"));
        assert_eq!(g.get("children"), Some(&Value::Array(vec![])));

        let f = file_reference("Card.swift", "sourcecode.swift");
        assert_eq!(f.get_str("isa"), Some("PBXFileReference"));
        assert_eq!(f.get_str("lastKnownFileType"), Some("sourcecode.swift"));
        assert_eq!(f.get_str("sourceTree"), Some("<group>"));

        let b = build_file(&ObjectId::from("ABC"));
        assert_eq!(b.get_str("isa"), Some("PBXBuildFile"));
        assert_eq!(b.get_str("fileRef"), Some("ABC"));
    }
}
