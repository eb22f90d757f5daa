//! Формат NIMS bin (вывод программы nimsread)
//!
//! Файл состоит из двух неформатированных записей Fortran: заголовка и блока
//! данных. Каждая запись обрамлена 4-байтовыми маркерами длины, ведущий и
//! замыкающий маркеры совпадают. Все поля занимают 4 байта независимо от
//! платформы, порядок байт определяется по маркеру длины заголовка.
//!
//! ```text
//! [rl]
//!   lat lon decl dt elev            f32 × 5
//!   start_time[6] clock_zero[6]     i32 × 12
//!   nscans gaptyp missing ngaps     i32 × 4
//!   gaps[3 × ngaps]                 i32
//!   padding[rl/4 − 21 − 3·ngaps]    i32
//! [rl]
//! [rl2] data[rl2/4] [rl2]
//! ```

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use nims_types::{BinHeader, NimsError, NimsResult, SampleBlock, CHANNEL_COUNT};

/// Размер слова в файле
pub const BIN_WORD_SIZE: usize = 4;

/// Наибольшее правдоподобное количество пропусков при выборе порядка байт
pub const MAX_GAP_CANDIDATE: i32 = 100;

/// Каноническая длина выровненного заголовка: (256·5 − 3)·4
pub const PADDED_HEADER_LEN: i32 = 5108;

/// Годы, представимые в поле BTIME записи Mini-SEED
pub const BTIME_YEARS: std::ops::RangeInclusive<i32> = 0..=u16::MAX as i32;

/// Кандидат количества пропусков для маркера длины заголовка `rl`.
pub fn gap_candidate(rl: i32) -> i32 {
    (rl / 4 - BinHeader::FIXED_WORDS) / 3
}

/// `true`, если маркер `rl` правдоподобен в данном порядке байт.
pub fn is_plausible_header_len(rl: i32) -> bool {
    let ng = gap_candidate(rl);
    (0..=MAX_GAP_CANDIDATE).contains(&ng) || rl == PADDED_HEADER_LEN
}

/// Количество слов выравнивания после таблицы пропусков.
///
/// Отрицательное количество пропусков или таблица, не помещающаяся в
/// заголовок длины `rl`, дают [`NimsError::Header`].
pub fn padding_words(
    rl: i32,
    gap_count: i32,
) -> NimsResult<usize> {
    let padding = 1 + i64::from(rl) / 4 - 22 - 3 * i64::from(gap_count);

    if gap_count < 0 || padding < 0 {
        return Err(NimsError::header(format!(
            "Gap count {gap_count} does not fit header length {rl}"
        )));
    }

    Ok(padding as usize)
}

/// Расширение [`BinHeader`] для работы со временем.
pub trait BinHeaderExt {
    /// Абсолютное время первого скана.
    fn start_datetime(&self) -> NimsResult<NaiveDateTime>;

    /// Проверяет частоту дискретизации и размер блока данных.
    fn validate_layout(
        &self,
        block: &SampleBlock,
    ) -> NimsResult<()>;
}

impl BinHeaderExt for BinHeader {
    fn start_datetime(&self) -> NimsResult<NaiveDateTime> {
        let [year, month, day, hour, minute, second] = self.start_time;

        let date = u32::try_from(month)
            .ok()
            .zip(u32::try_from(day).ok())
            .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .ok_or_else(|| {
                NimsError::format_violation(format!(
                    "Invalid start date: year {year}, month {month}, day-of-month {day}"
                ))
            })?;

        let time = u32::try_from(hour)
            .ok()
            .zip(u32::try_from(minute).ok())
            .zip(u32::try_from(second).ok())
            .and_then(|((h, m), s)| date.and_hms_opt(h, m, s))
            .ok_or_else(|| {
                NimsError::format_violation(format!(
                    "Invalid start time: {hour}:{minute}:{second}"
                ))
            })?;

        check_btime_year(time)
    }

    fn validate_layout(
        &self,
        block: &SampleBlock,
    ) -> NimsResult<()> {
        let rate = self.sample_rate();

        if !rate.is_finite() || rate <= 0.0 {
            return Err(NimsError::format_violation(format!(
                "Invalid sample rate {rate} Hz (dt = {})",
                self.dt
            )));
        }

        let expected = (self.nscans as i64) * CHANNEL_COUNT as i64 * BIN_WORD_SIZE as i64;

        if self.nscans < 0 || expected != block.byte_len as i64 {
            return Err(NimsError::format_violation(format!(
                "Unexpected data array size ({} bytes) for {} scans of {} channels",
                block.byte_len, self.nscans, CHANNEL_COUNT
            )));
        }

        Ok(())
    }
}

/// Время скана `index`: `start + index / sample_rate`, с точностью до
/// микросекунды (дробная часть отбрасывается).
///
/// Время вне диапазона `chrono` или года BTIME даёт
/// [`NimsError::FormatViolation`].
pub fn scan_time(
    start: NaiveDateTime,
    index: usize,
    sample_rate: f64,
) -> NimsResult<NaiveDateTime> {
    let micros = index as f64 / sample_rate * 1_000_000.0;

    // i64::MAX as f64 округляется вверх, граница строгая
    if !micros.is_finite() || micros >= i64::MAX as f64 {
        return Err(NimsError::format_violation(format!(
            "Scan {index} at {sample_rate} Hz is out of the time range"
        )));
    }

    let time = start
        .checked_add_signed(Duration::microseconds(micros as i64))
        .ok_or_else(|| {
            NimsError::format_violation(format!(
                "Scan {index} at {sample_rate} Hz is out of the time range from {start}"
            ))
        })?;

    check_btime_year(time)
}

fn check_btime_year(time: NaiveDateTime) -> NimsResult<NaiveDateTime> {
    if !BTIME_YEARS.contains(&time.year()) {
        return Err(NimsError::format_violation(format!(
            "Year {} of {time} does not fit a Mini-SEED record header",
            time.year()
        )));
    }

    Ok(time)
}
