use std::path::PathBuf;

use thiserror::Error;

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Ошибка ввода/вывода вне конкретного входного файла
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка чтения или упаковки NIMS
    #[error("NIMS error: {0}")]
    Nims(#[from] nims_types::NimsError),

    /// Неверная конфигурация (проверяется до открытия входных файлов)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ошибка обработки конкретного входного файла
    #[error("[{}] {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: nims_types::NimsError,
    },
}

impl ConvertError {
    pub fn config<S: Into<String>>(s: S) -> Self {
        Self::Config(s.into())
    }

    /// Привязывает ошибку NIMS к входному файлу.
    pub fn input(
        path: impl Into<PathBuf>,
        source: nims_types::NimsError,
    ) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }
}
