use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use nims_types::Endianness;

pub fn write_i32_stream<W: Write>(
    w: &mut W,
    order: Endianness,
    val: i32,
) -> std::io::Result<()> {
    match order {
        Endianness::Little => w.write_i32::<LittleEndian>(val),
        Endianness::Big => w.write_i32::<BigEndian>(val),
    }
}

pub fn write_f32_stream<W: Write>(
    w: &mut W,
    order: Endianness,
    val: f32,
) -> std::io::Result<()> {
    match order {
        Endianness::Little => w.write_f32::<LittleEndian>(val),
        Endianness::Big => w.write_f32::<BigEndian>(val),
    }
}

// Запись в фиксированный буфер записи Mini-SEED со сдвигом `off`

pub fn write_u16_local(
    buf: &mut [u8],
    off: &mut usize,
    order: Endianness,
    val: u16,
) {
    match order {
        Endianness::Little => LittleEndian::write_u16(&mut buf[*off..*off + 2], val),
        Endianness::Big => BigEndian::write_u16(&mut buf[*off..*off + 2], val),
    }
    *off += 2;
}

pub fn write_i16_local(
    buf: &mut [u8],
    off: &mut usize,
    order: Endianness,
    val: i16,
) {
    write_u16_local(buf, off, order, val as u16);
}

pub fn write_u32_local(
    buf: &mut [u8],
    off: &mut usize,
    order: Endianness,
    val: u32,
) {
    match order {
        Endianness::Little => LittleEndian::write_u32(&mut buf[*off..*off + 4], val),
        Endianness::Big => BigEndian::write_u32(&mut buf[*off..*off + 4], val),
    }
    *off += 4;
}

pub fn write_i32_local(
    buf: &mut [u8],
    off: &mut usize,
    order: Endianness,
    val: i32,
) {
    write_u32_local(buf, off, order, val as u32);
}

pub fn write_f32_local(
    buf: &mut [u8],
    off: &mut usize,
    order: Endianness,
    val: f32,
) {
    write_u32_local(buf, off, order, val.to_bits());
}
