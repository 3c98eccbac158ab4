use std::path::PathBuf;

use thiserror::Error;

/// Fatal input errors: the source workbook cannot be read at all.
///
/// Everything downstream of a successful read (bad numeric cells, missing
/// optional columns, per-record remote failures) is handled in place and
/// never surfaces as an error.
#[derive(Debug, Error)]
pub enum SourceFormatError {
    #[error("failed to open workbook {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    #[error("sheet {name:?} not found in {}", path.display())]
    SheetNotFound { name: String, path: PathBuf },

    #[error("workbook {} contains no sheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("failed to read sheet {name:?} from {}", path.display())]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },
}
