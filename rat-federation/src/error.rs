use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to lock mutex: poisoned"))]
    LockPoisoned,

    #[snafu(display("Mount target '{container}' is not attached to the visible tree"))]
    InvalidMountTarget { container: String },

    #[snafu(display("Container '{container}' is already occupied by remote '{owner}'"))]
    ContainerOccupied { container: String, owner: String },

    #[snafu(display("Unknown remote application: '{id}'"))]
    RemoteNotFound { id: String },

    #[snafu(display("Failed to load remote '{id}': {message}"))]
    RemoteLoad { id: String, message: String },

    #[snafu(display("Remote '{remote}' failed to mount: {message}"))]
    MountFailed { remote: String, message: String },

    #[snafu(display("Unknown theme: '{value}' (expected 'light' or 'dark')"))]
    UnknownTheme { value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
