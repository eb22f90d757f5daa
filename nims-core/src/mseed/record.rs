use std::io::Write;

use chrono::{Datelike, NaiveDateTime, Timelike};
use log::trace;
use nims_types::{Encoding, Endianness, NimsError, NimsResult};

use super::{
    rate::factor_multiplier,
    steim::{encode_steim, SteimVersion},
    PackStats, RecordEncoder,
};
use crate::{
    binary::{write_f32_local, write_i16_local, write_i32_local, write_u16_local},
    format::scan_time,
};

/// Размер фиксированного заголовка записи
pub const FIXED_HEADER_SIZE: usize = 48;

/// Размер blockette 1000
pub const BLOCKETTE_1000_SIZE: usize = 8;

/// Размер blockette 100
pub const BLOCKETTE_100_SIZE: usize = 12;

/// Выравнивание начала данных
pub const DATA_ALIGNMENT: usize = 64;

/// Допустимые длины записи
pub const MIN_RECORD_LEN: usize = 256;
pub const MAX_RECORD_LEN: usize = 65536;
pub const DEFAULT_RECORD_LEN: usize = 4096;

/// Наибольший номер последовательности (6 цифр)
pub const MAX_SEQUENCE: u32 = 999_999;

/// Параметры записей одного участка данных.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTemplate {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    /// Время первой выборки участка
    pub start_time: NaiveDateTime,
    pub sample_rate: f64,
    pub encoding: Encoding,
    pub record_len: usize,
    pub byte_order: Endianness,
    /// Добавлять blockette 100 с точной частотой
    pub blockette_100: bool,
}

impl RecordTemplate {
    /// Количество blockettes в заголовке.
    pub fn blockette_count(&self) -> u8 {
        if self.blockette_100 {
            2
        } else {
            1
        }
    }

    /// Смещение данных: следующая 64-байтовая граница после blockettes.
    pub fn data_offset(&self) -> usize {
        let mut end = FIXED_HEADER_SIZE + BLOCKETTE_1000_SIZE;
        if self.blockette_100 {
            end += BLOCKETTE_100_SIZE;
        }
        end.div_ceil(DATA_ALIGNMENT) * DATA_ALIGNMENT
    }

    /// Показатель степени двойки длины записи.
    pub fn record_len_exponent(&self) -> NimsResult<u8> {
        if !is_valid_record_len(self.record_len) {
            return Err(NimsError::pack(format!(
                "Record length {} is not a power of two in {MIN_RECORD_LEN}..={MAX_RECORD_LEN}",
                self.record_len
            )));
        }

        Ok(self.record_len.trailing_zeros() as u8)
    }
}

/// `true` для степени двойки в диапазоне 256..=65536.
pub fn is_valid_record_len(len: usize) -> bool {
    len.is_power_of_two() && (MIN_RECORD_LEN..=MAX_RECORD_LEN).contains(&len)
}

/// Кодировщик Mini-SEED 2 с собственной нумерацией записей.
#[derive(Debug)]
pub struct MseedEncoder {
    sequence: u32,
}

impl Default for MseedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MseedEncoder {
    pub fn new() -> Self {
        Self { sequence: 1 }
    }

    /// Номер, который получит следующая запись.
    pub fn next_sequence(&self) -> u32 {
        self.sequence
    }

    fn advance_sequence(&mut self) -> u32 {
        let current = self.sequence;
        self.sequence = if current >= MAX_SEQUENCE {
            1
        } else {
            current + 1
        };
        current
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Собственные методы
    ////////////////////////////////////////////////////////////////////////////////

    fn encode_data(
        template: &RecordTemplate,
        samples: &[i32],
        previous: Option<i32>,
        data: &mut [u8],
    ) -> NimsResult<usize> {
        match template.encoding {
            Encoding::Int32 => {
                let n = samples.len().min(data.len() / 4);
                let mut off = 0;
                for &s in &samples[..n] {
                    write_i32_local(data, &mut off, template.byte_order, s);
                }
                Ok(n)
            }
            Encoding::Steim1 => encode_steim(
                samples,
                previous,
                data,
                template.byte_order,
                SteimVersion::Steim1,
            ),
            Encoding::Steim2 => encode_steim(
                samples,
                previous,
                data,
                template.byte_order,
                SteimVersion::Steim2,
            ),
        }
    }
}

impl RecordEncoder for MseedEncoder {
    fn encode(
        &mut self,
        template: &RecordTemplate,
        samples: &[i32],
        sink: &mut dyn Write,
    ) -> NimsResult<PackStats> {
        let exponent = template.record_len_exponent()?;
        let (factor, multiplier) = factor_multiplier(template.sample_rate)?;
        let data_offset = template.data_offset();

        let mut stats = PackStats::default();
        let mut previous = None;

        while stats.samples < samples.len() {
            let mut record = vec![0u8; template.record_len];
            let remaining = &samples[stats.samples..];
            let window = &remaining[..remaining.len().min(u16::MAX as usize)];

            let n = Self::encode_data(template, window, previous, &mut record[data_offset..])?;

            if n == 0 {
                return Err(NimsError::pack(format!(
                    "No samples fit into a {} byte record",
                    template.record_len
                )));
            }

            let start = scan_time(template.start_time, stats.samples, template.sample_rate)?;
            let sequence = self.advance_sequence();

            let header = FixedHeader {
                sequence,
                start,
                nsamples: n as u16,
                factor,
                multiplier,
                data_offset: data_offset as u16,
            };
            header.write(&mut record, template);
            write_blockettes(&mut record, template, exponent);

            sink.write_all(&record)?;

            trace!(
                "Record {sequence:06} {}: {n} samples starting {start}",
                template.channel
            );

            previous = Some(window[n - 1]);
            stats.samples += n;
            stats.records += 1;
        }

        Ok(stats)
    }
}

/// Изменяемые поля фиксированного заголовка.
struct FixedHeader {
    sequence: u32,
    start: NaiveDateTime,
    nsamples: u16,
    factor: i16,
    multiplier: i16,
    data_offset: u16,
}

impl FixedHeader {
    fn write(
        &self,
        buf: &mut [u8],
        template: &RecordTemplate,
    ) {
        let order = template.byte_order;

        buf[0..6].copy_from_slice(format!("{:06}", self.sequence).as_bytes());
        buf[6] = b'D';
        buf[7] = b' ';

        write_padded(&mut buf[8..13], &template.station);
        write_padded(&mut buf[13..15], &template.location);
        write_padded(&mut buf[15..18], &template.channel);
        write_padded(&mut buf[18..20], &template.network);

        // BTIME, доли секунды в единицах 0.0001 с
        let t = self.start;
        let mut off = 20;
        // Год проверен в scan_time
        write_u16_local(buf, &mut off, order, t.year() as u16);
        write_u16_local(buf, &mut off, order, t.ordinal() as u16);
        buf[24] = t.hour() as u8;
        buf[25] = t.minute() as u8;
        buf[26] = t.second() as u8;
        buf[27] = 0;
        off = 28;
        write_u16_local(
            buf,
            &mut off,
            order,
            (t.nanosecond().min(999_999_999) / 100_000) as u16,
        );

        write_u16_local(buf, &mut off, order, self.nsamples);
        write_i16_local(buf, &mut off, order, self.factor);
        write_i16_local(buf, &mut off, order, self.multiplier);

        // Флаги активности, ввода-вывода и качества
        buf[36..39].fill(0);
        buf[39] = template.blockette_count();

        off = 40;
        write_i32_local(buf, &mut off, order, 0);
        write_u16_local(buf, &mut off, order, self.data_offset);
        write_u16_local(buf, &mut off, order, FIXED_HEADER_SIZE as u16);
    }
}

fn write_blockettes(
    buf: &mut [u8],
    template: &RecordTemplate,
    exponent: u8,
) {
    let order = template.byte_order;
    let mut off = FIXED_HEADER_SIZE;

    let next = if template.blockette_100 {
        (FIXED_HEADER_SIZE + BLOCKETTE_1000_SIZE) as u16
    } else {
        0
    };

    write_u16_local(buf, &mut off, order, 1000);
    write_u16_local(buf, &mut off, order, next);
    buf[off] = template.encoding.as_u8();
    buf[off + 1] = template.byte_order.as_u8();
    buf[off + 2] = exponent;
    buf[off + 3] = 0;
    off += 4;

    if template.blockette_100 {
        write_u16_local(buf, &mut off, order, 100);
        write_u16_local(buf, &mut off, order, 0);
        write_f32_local(buf, &mut off, order, template.sample_rate as f32);
        buf[off..off + 4].fill(0);
    }
}

/// Копирует код в поле фиксированной ширины, дополняя пробелами.
fn write_padded(
    field: &mut [u8],
    code: &str,
) {
    field.fill(b' ');
    for (dst, src) in field.iter_mut().zip(code.bytes()) {
        *dst = src;
    }
}
