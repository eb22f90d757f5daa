use thiserror::Error;

/// Результат для операций конвертера NIMS
pub type NimsResult<T> = std::result::Result<T, NimsError>;

/// Типы ошибок чтения NIMS bin и упаковки Mini-SEED.
#[derive(Debug, Error)]
pub enum NimsError {
    /// Короткое чтение или ошибка чтения конкретного поля
    #[error("I/O error reading {field}: {source}")]
    Read {
        field: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Повреждённый или противоречивый заголовок / маркеры длины
    #[error("Header error: {0}")]
    Header(String),

    /// Нарушение формата (частота, размер блока данных, время)
    #[error("Format violation: {0}")]
    FormatViolation(String),

    /// Для частоты нет буквы диапазона SEED
    #[error("No SEED band code for sample rate {0} Hz")]
    UnsupportedBandCode(f64),

    /// Канал вне диапазона 1..=5
    #[error("Unsupported channel index: {0} (only 1..=5 are named)")]
    UnsupportedChannelIndex(u8),

    /// Ошибка кодировщика записей
    #[error("Pack error: {0}")]
    Pack(String),
}

impl NimsError {
    /// Удобные конструкторы
    pub fn header<S: Into<String>>(s: S) -> Self {
        Self::Header(s.into())
    }

    pub fn format_violation<S: Into<String>>(s: S) -> Self {
        Self::FormatViolation(s.into())
    }

    pub fn pack<S: Into<String>>(s: S) -> Self {
        Self::Pack(s.into())
    }

    /// Оборачивает ошибку чтения, указывая имя поля.
    pub fn read(
        field: &'static str,
        source: std::io::Error,
    ) -> Self {
        Self::Read { field, source }
    }

    /// `true` для ошибок, вызванных неверным содержимым файла (а не I/O).
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Self::FormatViolation(_)
                | Self::UnsupportedBandCode(_)
                | Self::UnsupportedChannelIndex(_)
        )
    }
}
