use std::path::PathBuf;

use thiserror::Error;

/// Failures loading the submissions export.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(
        "cannot find input file: {}\nhint: export the submission titles to this path or pass --input",
        .path.display()
    )]
    Missing { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
