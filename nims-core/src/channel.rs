//! Имена каналов SEED для пяти каналов NIMS.
//!
//! Первая буква определяется частотой дискретизации, суффикс индексом
//! канала: три магнитных компоненты и две электрических.

use nims_types::{NimsError, NimsResult};

/// Диапазоны частот `[low, high)` и соответствующие буквы SEED.
///
/// Строка `T` пуста и никогда не совпадает.
const BAND_TABLE: &[(f64, f64, char)] = &[
    (10.0, 80.0, 'B'),
    (1.01, 10.0, 'M'),
    (0.5, 1.01, 'L'),
    (0.05, 0.5, 'V'),
    (0.001, 0.05, 'U'),
    (0.0001, 0.001, 'R'),
    (0.00001, 0.0001, 'P'),
    (0.00001, 0.00001, 'T'),
];

/// Ниже этой частоты используется буква `Q`.
const Q_BAND_CEILING: f64 = 0.000001;

/// Суффиксы каналов 1..=5: магнитные N/E/Z, электрические N/E
const CHANNEL_SUFFIXES: [&str; 5] = ["FN", "FE", "FZ", "QN", "QE"];

/// Буква диапазона SEED для частоты `freq` (Гц).
pub fn band_code(freq: f64) -> NimsResult<char> {
    if let Some(&(_, _, code)) = BAND_TABLE
        .iter()
        .find(|(low, high, _)| freq >= *low && freq < *high)
    {
        return Ok(code);
    }

    if freq < Q_BAND_CEILING {
        return Ok('Q');
    }

    Err(NimsError::UnsupportedBandCode(freq))
}

/// Суффикс канала с индексом `channel` (1..=5).
pub fn channel_suffix(channel: u8) -> NimsResult<&'static str> {
    match channel {
        1..=5 => Ok(CHANNEL_SUFFIXES[channel as usize - 1]),
        _ => Err(NimsError::UnsupportedChannelIndex(channel)),
    }
}

/// Трёхбуквенное имя канала SEED, например `LFZ`.
///
/// Частота проверяется раньше индекса канала.
pub fn channel_name(
    freq: f64,
    channel: u8,
) -> NimsResult<String> {
    let band = band_code(freq)?;
    let suffix = channel_suffix(channel)?;

    Ok(format!("{band}{suffix}"))
}
