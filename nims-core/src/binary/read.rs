use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use nims_types::{Endianness, NimsError, NimsResult};

/// Декодирует 4 байта как `i32` в порядке `order`.
pub fn decode_i32(
    bytes: [u8; 4],
    order: Endianness,
) -> i32 {
    match order {
        Endianness::Little => LittleEndian::read_i32(&bytes),
        Endianness::Big => BigEndian::read_i32(&bytes),
    }
}

pub fn read_i32_local<R: Read>(
    r: &mut R,
    order: Endianness,
    field: &'static str,
) -> NimsResult<i32> {
    let v = match order {
        Endianness::Little => r.read_i32::<LittleEndian>(),
        Endianness::Big => r.read_i32::<BigEndian>(),
    };

    v.map_err(|e| NimsError::read(field, e))
}

pub fn read_f32_local<R: Read>(
    r: &mut R,
    order: Endianness,
    field: &'static str,
) -> NimsResult<f32> {
    let v = match order {
        Endianness::Little => r.read_f32::<LittleEndian>(),
        Endianness::Big => r.read_f32::<BigEndian>(),
    };

    v.map_err(|e| NimsError::read(field, e))
}

pub fn read_i32_array<R: Read, const N: usize>(
    r: &mut R,
    order: Endianness,
    field: &'static str,
) -> NimsResult<[i32; N]> {
    let mut out = [0i32; N];

    for v in out.iter_mut() {
        *v = read_i32_local(r, order, field)?;
    }

    Ok(out)
}

/// Читает `count` слов int32.
///
/// Буфер растёт по мере чтения, поэтому ложный счётчик в усечённом файле
/// не приводит к выделению всей заявленной памяти.
pub fn read_i32_vec<R: Read>(
    r: &mut R,
    count: usize,
    order: Endianness,
    field: &'static str,
) -> NimsResult<Vec<i32>> {
    let byte_len = count as u64 * 4;
    let mut bytes = Vec::new();

    r.take(byte_len)
        .read_to_end(&mut bytes)
        .map_err(|e| NimsError::read(field, e))?;

    if bytes.len() as u64 != byte_len {
        return Err(NimsError::read(
            field,
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {byte_len} bytes, got {}", bytes.len()),
            ),
        ));
    }

    let mut out = vec![0i32; count];

    match order {
        Endianness::Little => LittleEndian::read_i32_into(&bytes, &mut out),
        Endianness::Big => BigEndian::read_i32_into(&bytes, &mut out),
    }

    Ok(out)
}
