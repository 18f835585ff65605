use thiserror::Error;

use crate::ObjectId;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object {id} is missing required key {key}")]
    MissingKey { id: ObjectId, key: String },

    #[error("project document has no usable {0} entry")]
    MissingDocumentKey(&'static str),

    #[error("object {0} does not exist")]
    MissingObject(ObjectId),

    #[error("project document is not a dictionary")]
    NotADictionary,

    #[error("object {0} is not a dictionary")]
    ObjectNotADictionary(ObjectId),

    #[error(transparent)]
    Parse(#[from] pbxproj::Error),

    #[error("cannot replace project file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("key {key} of object {id} has an unexpected type")]
    WrongType { id: ObjectId, key: String },
}
