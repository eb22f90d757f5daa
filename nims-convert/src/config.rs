use std::path::PathBuf;

use nims_core::{
    mseed::{is_valid_record_len, DEFAULT_RECORD_LEN, MAX_RECORD_LEN, MIN_RECORD_LEN},
    OutputMode, OutputTarget, PackParams,
};
use nims_types::{Encoding, Endianness};

use crate::{ConvertError, ConvertResult};

/// Сеть по умолчанию
pub const DEFAULT_NETWORK: &str = "EM";

/// Полная конфигурация запуска конвертера.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Код сети (до 2 символов)
    pub network: String,
    /// Код станции (до 5 символов)
    pub station: String,
    /// Код локации (до 2 символов)
    pub location: String,
    /// Кодирование данных записей
    pub encoding: Encoding,
    /// Длина записи, байты
    pub record_len: usize,
    /// Порядок байт записей
    pub byte_order: Endianness,
    /// Добавлять blockette 100
    pub blockette_100: bool,
    /// Отдельный файл на каждый участок канала
    pub per_channel: bool,
    /// Единственный выходной файл (`-` для stdout)
    pub output_file: Option<String>,
    /// Каталог для сгенерированных имён файлов
    pub output_dir: Option<PathBuf>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ConvertConfig {
    /// Проверка до открытия входных файлов.
    pub fn validate(&self) -> ConvertResult<()> {
        if !is_valid_record_len(self.record_len) {
            return Err(ConvertError::config(format!(
                "Invalid record length {}: must be a power of two in {MIN_RECORD_LEN}..={MAX_RECORD_LEN}",
                self.record_len
            )));
        }

        if let Some(dir) = &self.output_dir {
            if !dir.is_dir() {
                return Err(ConvertError::config(format!(
                    "Output directory {} does not exist",
                    dir.display()
                )));
            }
        }

        if matches!(self.output_file.as_deref(), Some("")) {
            return Err(ConvertError::config("Output file name is empty"));
        }

        Ok(())
    }

    /// Режим выходных файлов: `-o` имеет приоритет над `-C`.
    pub fn output_mode(&self) -> OutputMode {
        match (&self.output_file, self.per_channel) {
            (Some(file), _) => OutputMode::Single(OutputTarget::parse(file)),
            (None, true) => OutputMode::PerChannel,
            (None, false) => OutputMode::Consolidated,
        }
    }

    pub fn pack_params(&self) -> PackParams {
        PackParams {
            network: self.network.clone(),
            station: self.station.clone(),
            location: self.location.clone(),
            encoding: self.encoding,
            record_len: self.record_len,
            byte_order: self.byte_order,
            blockette_100: self.blockette_100,
        }
        .cleaned()
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.into(),
            station: String::new(),
            location: String::new(),
            encoding: Encoding::Steim2,
            record_len: DEFAULT_RECORD_LEN,
            byte_order: Endianness::Big,
            blockette_100: false,
            per_channel: false,
            output_file: None,
            output_dir: None,
        }
    }
}

/// Парсит кодирование: `3`/`int32`, `10`/`steim1`, `11`/`steim2`.
pub fn parse_encoding(s: &str) -> Result<Encoding, String> {
    s.trim().parse::<Encoding>()
}

/// Парсит порядок байт: `0` little-endian, `1` big-endian.
pub fn parse_byte_order(s: &str) -> Result<Endianness, String> {
    match s.trim().to_lowercase().as_str() {
        "0" | "little" | "lsbf" => Ok(Endianness::Little),
        "1" | "big" | "msbf" => Ok(Endianness::Big),
        other => Err(format!(
            "Unsupported byte order '{other}'. Use: 0 (little-endian), 1 (big-endian)"
        )),
    }
}

/// Парсит длину записи: степень двойки от 256 до 65536.
pub fn parse_record_length(s: &str) -> Result<usize, String> {
    let len: usize = s
        .trim()
        .parse()
        .map_err(|e| format!("Invalid record length '{s}': {e}"))?;

    if !is_valid_record_len(len) {
        return Err(format!(
            "Invalid record length {len}: must be a power of two in {MIN_RECORD_LEN}..={MAX_RECORD_LEN}"
        ));
    }

    Ok(len)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
