//! `project` wraps a parsed `project.pbxproj` document and provides typed
//! access to its object store.
//!
//! The store is append-only from the point of view of this crate: records can
//! be added and identifiers appended to their lists, but nothing is ever
//! removed or renamed.

use std::{fs, io::Write, mem, path::Path};

use pbxproj::{Dictionary, Value};
use tempfile::NamedTempFile;

mod error;
mod object;
pub mod records;

pub use self::error::Error;
pub use self::object::{Isa, Object, ObjectId};

#[derive(Debug, Clone)]
pub struct Project {
    // The top level document, with an empty placeholder where the objects
    // dictionary lives so that key order survives a save.
    document: Dictionary,
    objects: Dictionary,
    root_object: ObjectId,
}

impl Project {
    /// Reads and parses the project file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(input: &str) -> Result<Self, Error> {
        Self::from_value(pbxproj::parse(input)?)
    }

    pub fn from_value(value: Value) -> Result<Self, Error> {
        let mut document = match value {
            Value::Dictionary(document) => document,
            _ => return Err(Error::NotADictionary),
        };

        let root_object = document
            .get_str("rootObject")
            .map(ObjectId::from)
            .ok_or(Error::MissingDocumentKey("rootObject"))?;

        let objects = document
            .get_mut("objects")
            .and_then(Value::as_dictionary_mut)
            .map(mem::take)
            .ok_or(Error::MissingDocumentKey("objects"))?;

        let project = Self {
            document,
            objects,
            root_object,
        };
        project.root()?;

        Ok(project)
    }

    /// Rebuilds the full document, objects included.
    pub fn to_value(&self) -> Value {
        let mut document = self.document.clone();
        document.insert("objects", self.objects.clone());
        Value::Dictionary(document)
    }

    /// Writes the project to `path`.
    ///
    /// The document is written to a temporary file next to `path` and then
    /// renamed over it, so a failed write never leaves a truncated project
    /// behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        pbxproj::write(&mut file, &self.to_value())?;
        file.flush()?;

        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(file.path(), metadata.permissions())?;
        }

        file.persist(path)?;
        log::debug!("wrote {}", path.display());

        Ok(())
    }

    pub fn root_object(&self) -> &ObjectId {
        &self.root_object
    }

    /// The `PBXProject` record.
    pub fn root(&self) -> Result<Object<'_>, Error> {
        self.object(&self.root_object)
    }

    pub fn main_group(&self) -> Result<ObjectId, Error> {
        self.root()?
            .string("mainGroup")
            .map(ObjectId::from)
            .ok_or_else(|| Error::MissingKey {
                id: self.root_object.clone(),
                key: String::from("mainGroup"),
            })
    }

    pub fn targets(&self) -> Result<Vec<ObjectId>, Error> {
        Ok(self.root()?.references("targets"))
    }

    pub fn get(&self, id: &ObjectId) -> Option<Object<'_>> {
        self.object(id).ok()
    }

    pub fn object(&self, id: &ObjectId) -> Result<Object<'_>, Error> {
        // The view borrows the key stored in the document, not the caller's.
        match self.objects.iter().find(|(key, _)| key.as_str() == id.as_str()) {
            Some((key, Value::Dictionary(record))) => Ok(Object::new(key, record)),
            Some(_) => Err(Error::ObjectNotADictionary(id.clone())),
            None => Err(Error::MissingObject(id.clone())),
        }
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = Object<'_>> {
        self.objects.iter().filter_map(|(id, value)| {
            value
                .as_dictionary()
                .map(|record| Object::new(id.as_str(), record))
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Adds a record under a freshly generated identifier and returns that
    /// identifier. Identifiers already in the store are never reused.
    pub fn add_object(&mut self, record: Dictionary) -> ObjectId {
        let mut id = ObjectId::generate();
        while self.contains(&id) {
            log::warn!("generated identifier {} already exists; retrying", id);
            id = ObjectId::generate();
        }

        self.objects.insert(id.as_str(), record);
        id
    }

    /// Appends `child` to the list stored under `key` in the record `owner`,
    /// creating the list if the record doesn't have one yet.
    pub fn append_reference(
        &mut self,
        owner: &ObjectId,
        key: &str,
        child: &ObjectId,
    ) -> Result<(), Error> {
        let record = match self.objects.get_mut(owner) {
            Some(Value::Dictionary(record)) => record,
            Some(_) => return Err(Error::ObjectNotADictionary(owner.clone())),
            None => return Err(Error::MissingObject(owner.clone())),
        };

        if !record.contains_key(key) {
            record.insert(key, Value::Array(Vec::new()));
        }

        match record.get_mut(key).and_then(Value::as_array_mut) {
            Some(list) => {
                list.push(child.clone().into());
                Ok(())
            }
            None => Err(Error::WrongType {
                id: owner.clone(),
                key: String::from(key),
            }),
        }
    }
}
