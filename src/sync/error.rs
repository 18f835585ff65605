use std::path::StripPrefixError;

use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("cannot find group {0:?} under the main group; refusing to touch the project")]
    MissingAnchorGroup(String),

    #[error("cannot find a sources build phase for target {0:?}")]
    MissingSourcesBuildPhase(String),

    #[error(transparent)]
    Project(#[from] xcodeproj_sync_project::Error),

    #[error(transparent)]
    StripPrefix(#[from] StripPrefixError),
}
