//! Сжатие Steim-1 и Steim-2.
//!
//! Данные записи состоят из 64-байтовых кадров по 16 слов. Слово 0 кадра
//! содержит управляющие ниблы (по 2 бита на слово). В первом кадре записи
//! слова 1 и 2 хранят прямую и обратную константы интегрирования
//! (первую и последнюю выборку записи).

use nims_types::{Endianness, NimsError, NimsResult};

use crate::binary::write_u32_local;

/// Размер кадра Steim в байтах
pub const FRAME_SIZE: usize = 64;

/// Количество 4-байтовых слов в кадре
pub const FRAME_WORDS: usize = 16;

/// Наибольшее количество разностей в одном слове (Steim-2, 7 × 4 бита)
const MAX_DIFFS_PER_WORD: usize = 7;

/// Версия алгоритма Steim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteimVersion {
    Steim1,
    Steim2,
}

/// Упакованное слово данных.
#[derive(Debug, Clone, Copy)]
struct PackedWord {
    nibble: u32,
    word: u32,
    count: usize,
}

/// Форматы слов Steim-2 с нибблами 2 и 3: (количество, бит, ниббл, dnib).
const STEIM2_LAYOUTS: [(usize, u32, u32, u32); 6] = [
    (7, 4, 3, 0b10),
    (6, 5, 3, 0b01),
    (5, 6, 3, 0b00),
    (3, 10, 2, 0b11),
    (2, 15, 2, 0b10),
    (1, 30, 2, 0b01),
];

fn fits(
    value: i64,
    bits: u32,
) -> bool {
    let half = 1i64 << (bits - 1);
    (-half..half).contains(&value)
}

/// Четыре 8-битные разности (ниббл 1, одинаков для обеих версий).
fn pack_bytes(diffs: &[i64]) -> Option<PackedWord> {
    if diffs.len() < 4 || !diffs[..4].iter().all(|&d| fits(d, 8)) {
        return None;
    }

    let word = diffs[..4]
        .iter()
        .fold(0u32, |acc, &d| (acc << 8) | (d as u8 as u32));

    Some(PackedWord {
        nibble: 1,
        word,
        count: 4,
    })
}

fn pack_steim1(diffs: &[i64]) -> PackedWord {
    if let Some(w) = pack_bytes(diffs) {
        return w;
    }

    if diffs.len() >= 2 && fits(diffs[0], 16) && fits(diffs[1], 16) {
        return PackedWord {
            nibble: 2,
            word: ((diffs[0] as u16 as u32) << 16) | diffs[1] as u16 as u32,
            count: 2,
        };
    }

    // Разность вне диапазона i32 восстанавливается сложением по модулю 2^32
    PackedWord {
        nibble: 3,
        word: diffs[0] as i32 as u32,
        count: 1,
    }
}

fn pack_steim2(diffs: &[i64]) -> NimsResult<PackedWord> {
    for &(count, bits, nibble, dnib) in &STEIM2_LAYOUTS[..3] {
        if let Some(w) = pack_steim2_layout(diffs, count, bits, nibble, dnib) {
            return Ok(w);
        }
    }

    if let Some(w) = pack_bytes(diffs) {
        return Ok(w);
    }

    for &(count, bits, nibble, dnib) in &STEIM2_LAYOUTS[3..] {
        if let Some(w) = pack_steim2_layout(diffs, count, bits, nibble, dnib) {
            return Ok(w);
        }
    }

    Err(NimsError::pack(format!(
        "Steim-2 difference {} exceeds 30 bits",
        diffs[0]
    )))
}

fn pack_steim2_layout(
    diffs: &[i64],
    count: usize,
    bits: u32,
    nibble: u32,
    dnib: u32,
) -> Option<PackedWord> {
    if diffs.len() < count || !diffs[..count].iter().all(|&d| fits(d, bits)) {
        return None;
    }

    let mask = (1u32 << bits) - 1;
    let values = diffs[..count]
        .iter()
        .fold(0u32, |acc, &d| (acc << bits) | (d as u32 & mask));

    Some(PackedWord {
        nibble,
        word: (dnib << 30) | values,
        count,
    })
}

/// Кодирует начало `samples` в кадры Steim, заполняя `out`.
///
/// `previous` это последняя выборка предыдущей записи того же участка;
/// для первой записи первая разность равна нулю. Возвращает количество
/// упакованных выборок.
pub fn encode_steim(
    samples: &[i32],
    previous: Option<i32>,
    out: &mut [u8],
    order: Endianness,
    version: SteimVersion,
) -> NimsResult<usize> {
    let frames = out.len() / FRAME_SIZE;

    if frames == 0 {
        return Err(NimsError::pack(format!(
            "Data area of {} bytes is smaller than one Steim frame",
            out.len()
        )));
    }

    if samples.is_empty() {
        return Ok(0);
    }

    let diff = |i: usize| -> i64 {
        match i {
            0 => previous.map_or(0, |p| samples[0] as i64 - p as i64),
            _ => samples[i] as i64 - samples[i - 1] as i64,
        }
    };

    let mut packed = 0usize;
    let mut window = [0i64; MAX_DIFFS_PER_WORD];

    'frames: for frame in 0..frames {
        let base = frame * FRAME_SIZE;
        let first_word = if frame == 0 { 3 } else { 1 };
        let mut control = 0u32;

        for w in first_word..FRAME_WORDS {
            if packed >= samples.len() {
                write_frame_word(out, base, 0, control, order);
                break 'frames;
            }

            let n = (samples.len() - packed).min(MAX_DIFFS_PER_WORD);
            for (k, slot) in window[..n].iter_mut().enumerate() {
                *slot = diff(packed + k);
            }

            let pw = match version {
                SteimVersion::Steim1 => pack_steim1(&window[..n]),
                SteimVersion::Steim2 => pack_steim2(&window[..n])?,
            };

            control |= pw.nibble << (30 - 2 * w as u32);
            write_frame_word(out, base, w, pw.word, order);
            packed += pw.count;
        }

        write_frame_word(out, base, 0, control, order);
    }

    // Константы интегрирования X0 и Xn
    write_frame_word(out, 0, 1, samples[0] as u32, order);
    write_frame_word(out, 0, 2, samples[packed - 1] as u32, order);

    Ok(packed)
}

fn write_frame_word(
    out: &mut [u8],
    base: usize,
    word: usize,
    value: u32,
    order: Endianness,
) {
    let mut off = base + word * 4;
    write_u32_local(out, &mut off, order, value);
}

/// Декодер для проверки кодирования в тестах.
#[cfg(test)]
pub(crate) fn decode_steim(
    data: &[u8],
    nsamples: usize,
    order: Endianness,
    version: SteimVersion,
) -> Vec<i32> {
    use crate::binary::decode_i32;

    let word_at = |frame: usize, w: usize| -> u32 {
        let off = frame * FRAME_SIZE + w * 4;
        decode_i32([data[off], data[off + 1], data[off + 2], data[off + 3]], order) as u32
    };

    let sign_extend = |v: u32, bits: u32| -> i32 { ((v << (32 - bits)) as i32) >> (32 - bits) };

    let mut diffs: Vec<i32> = Vec::new();
    let x0 = word_at(0, 1) as i32;
    let xn = word_at(0, 2) as i32;

    for frame in 0..data.len() / FRAME_SIZE {
        let control = word_at(frame, 0);

        for w in 1..FRAME_WORDS {
            let nibble = (control >> (30 - 2 * w)) & 0b11;
            let word = word_at(frame, w);

            match (nibble, version) {
                (0, _) => {}
                (1, _) => {
                    for shift in [24, 16, 8, 0] {
                        diffs.push(((word >> shift) as u8) as i8 as i32);
                    }
                }
                (2, SteimVersion::Steim1) => {
                    diffs.push((word >> 16) as u16 as i16 as i32);
                    diffs.push(word as u16 as i16 as i32);
                }
                (3, SteimVersion::Steim1) => diffs.push(word as i32),
                (n, SteimVersion::Steim2) => {
                    let dnib = word >> 30;
                    let (count, bits) = match (n, dnib) {
                        (2, 0b01) => (1, 30),
                        (2, 0b10) => (2, 15),
                        (2, 0b11) => (3, 10),
                        (3, 0b00) => (5, 6),
                        (3, 0b01) => (6, 5),
                        (3, 0b10) => (7, 4),
                        other => panic!("invalid Steim-2 nibble/dnib {other:?}"),
                    };
                    let mask = (1u32 << bits) - 1;
                    for k in (0..count).rev() {
                        diffs.push(sign_extend((word >> (k * bits)) & mask, bits));
                    }
                }
                (n, v) => panic!("invalid nibble {n} for {v:?}"),
            }
        }
    }

    let mut out = Vec::with_capacity(nsamples);
    out.push(x0);
    for d in diffs.iter().take(nsamples).skip(1) {
        let last = *out.last().unwrap();
        out.push(last.wrapping_add(*d));
    }

    assert_eq!(*out.last().unwrap(), xn, "обратная константа интегрирования");
    out
}
