use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::{debug, warn};
use nims_types::{BinHeader, Endianness, NimsError, NimsResult, SampleBlock, GAP_TYPE_FILLED};

use crate::{
    binary::{
        decode_i32, read_f32_local, read_i32_array, read_i32_local, read_i32_vec,
        write_f32_stream, write_i32_stream,
    },
    format::{gap_candidate, is_plausible_header_len, padding_words, BIN_WORD_SIZE},
};

/// Потоковый читатель NIMS bin файлов.
///
/// Заголовок читается и проверяется в [`BinReader::new`], блок данных в
/// [`BinReader::read_block`].
pub struct BinReader<R: Read> {
    reader: BufReader<R>,
    header: BinHeader,
}

/// Потоковый писатель NIMS bin файлов (обратная операция к [`BinReader`]).
pub struct BinWriter<W: Write> {
    writer: BufWriter<W>,
    order: Endianness,
}

/// Содержимое одного bin файла.
#[derive(Debug, Clone)]
pub struct BinFile {
    pub header: BinHeader,
    pub block: SampleBlock,
}

impl<R: Read> BinReader<R> {
    /// Создаёт читатель, определяя порядок байт и читая заголовок.
    pub fn new(inner: R) -> NimsResult<Self> {
        let mut reader = BufReader::new(inner);

        let mut marker = [0u8; 4];
        reader
            .read_exact(&mut marker)
            .map_err(|e| NimsError::read("header length record", e))?;

        let order = detect_byte_order(marker)?;
        let rl = decode_i32(marker, order);

        if order != Endianness::native() {
            debug!("Byte swapping needed ({order} file)");
        }

        let latitude = read_f32_local(&mut reader, order, "latitude")?;
        let longitude = read_f32_local(&mut reader, order, "longitude")?;
        let declination = read_f32_local(&mut reader, order, "declination")?;
        let dt = read_f32_local(&mut reader, order, "sampling time")?;
        let elevation = read_f32_local(&mut reader, order, "elevation")?;

        debug!("Sampling rate: {:.3} Hz", 1.0 / dt);
        debug!("Site location: ({latitude:.3}, {longitude:.3}, {elevation:.3})");

        let start_time: [i32; 6] = read_i32_array(&mut reader, order, "start time")?;
        let clock_zero: [i32; 6] = read_i32_array(&mut reader, order, "clock zero time")?;

        debug!(
            "Time series start time: {}-{:02}-{:02} {}:{}:{}",
            start_time[0], start_time[1], start_time[2], start_time[3], start_time[4], start_time[5]
        );

        let nscans = read_i32_local(&mut reader, order, "number of data scans")?;
        let gap_type = read_i32_local(&mut reader, order, "gap type")?;

        if gap_type != GAP_TYPE_FILLED {
            warn!(
                "The gap type in the file is {gap_type}, but we are assuming the gaps are filled"
            );
        }

        let missing_data_flag = read_i32_local(&mut reader, order, "missing data flag")?;
        let gap_count = read_i32_local(&mut reader, order, "number of gaps")?;

        debug!("The number of gaps in the bin file is {gap_count}");

        let padding = padding_words(rl, gap_count)?;

        let gaps = read_i32_vec(&mut reader, 3 * gap_count as usize, order, "gap information")?
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        read_i32_vec(&mut reader, padding, order, "padding of the header")?;

        let trailer = read_i32_local(&mut reader, order, "end of header record")?;

        if trailer != rl {
            return Err(NimsError::header(format!(
                "End of header record marker {trailer} does not match {rl}"
            )));
        }

        let header = BinHeader {
            byte_order: order,
            record_len: rl,
            latitude,
            longitude,
            declination,
            dt,
            elevation,
            start_time,
            clock_zero,
            nscans,
            gap_type,
            missing_data_flag,
            gaps,
            padding_words: padding,
        };

        Ok(Self { reader, header })
    }

    /// Прочитанный и проверенный заголовок файла.
    pub fn header(&self) -> &BinHeader {
        &self.header
    }

    /// Читает блок данных, проверяя оба маркера длины.
    pub fn read_block(mut self) -> NimsResult<BinFile> {
        let order = self.header.byte_order;
        let rl = read_i32_local(&mut self.reader, order, "data length record")?;

        if rl < 0 || rl as usize % BIN_WORD_SIZE != 0 {
            return Err(NimsError::header(format!("Invalid data record length {rl}")));
        }

        let raw = read_i32_vec(
            &mut self.reader,
            rl as usize / BIN_WORD_SIZE,
            order,
            "data",
        )?;

        let trailer = read_i32_local(&mut self.reader, order, "end of data record")?;

        if trailer != rl {
            return Err(NimsError::header(format!(
                "End of data record marker {trailer} does not match {rl}"
            )));
        }

        let block = SampleBlock::from_raw(&raw, self.header.missing_data_flag);

        Ok(BinFile {
            header: self.header,
            block,
        })
    }
}

impl<W: Write> BinWriter<W> {
    /// Создаёт писатель с заданным порядком байт.
    pub fn new(
        inner: W,
        order: Endianness,
    ) -> Self {
        Self {
            writer: BufWriter::new(inner),
            order,
        }
    }

    /// Записывает заголовок. Маркер длины вычисляется из полей заголовка.
    pub fn write_header(
        &mut self,
        header: &BinHeader,
    ) -> NimsResult<()> {
        let w = &mut self.writer;
        let order = self.order;
        let rl = header.computed_record_len();

        write_i32_stream(w, order, rl)?;

        for v in [
            header.latitude,
            header.longitude,
            header.declination,
            header.dt,
            header.elevation,
        ] {
            write_f32_stream(w, order, v)?;
        }

        for v in header.start_time.iter().chain(header.clock_zero.iter()) {
            write_i32_stream(w, order, *v)?;
        }

        write_i32_stream(w, order, header.nscans)?;
        write_i32_stream(w, order, header.gap_type)?;
        write_i32_stream(w, order, header.missing_data_flag)?;
        write_i32_stream(w, order, header.gaps.len() as i32)?;

        for v in header.gaps.iter().flatten() {
            write_i32_stream(w, order, *v)?;
        }

        for _ in 0..header.padding_words {
            write_i32_stream(w, order, 0)?;
        }

        write_i32_stream(w, order, rl)?;

        Ok(())
    }

    /// Записывает блок данных в обрамлении маркеров длины.
    pub fn write_data(
        &mut self,
        raw: &[i32],
    ) -> NimsResult<()> {
        let rl = (raw.len() * BIN_WORD_SIZE) as i32;

        write_i32_stream(&mut self.writer, self.order, rl)?;

        for v in raw {
            write_i32_stream(&mut self.writer, self.order, *v)?;
        }

        write_i32_stream(&mut self.writer, self.order, rl)?;

        Ok(())
    }

    /// Записывает блок, сворачивая отсутствующие выборки во флаг.
    pub fn write_block(
        &mut self,
        block: &SampleBlock,
        missing_data_flag: i32,
    ) -> NimsResult<()> {
        self.write_data(&block.to_raw(missing_data_flag))
    }

    /// Сбрасывает буфер и возвращает внутренний поток.
    pub fn finish(self) -> NimsResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| NimsError::Io(e.into_error()))
    }
}

/// Определяет порядок байт по маркеру длины заголовка.
///
/// Сначала пробуется little-endian, затем обратный порядок.
pub fn detect_byte_order(marker: [u8; 4]) -> NimsResult<Endianness> {
    for order in [Endianness::Little, Endianness::Big] {
        if is_plausible_header_len(decode_i32(marker, order)) {
            return Ok(order);
        }
    }

    let rl = decode_i32(marker, Endianness::Little);

    Err(NimsError::header(format!(
        "Header length invalid: {rl} or number of gaps {} > 100",
        gap_candidate(rl)
    )))
}

/// Convenience: читает заголовок и данные bin файла по пути.
pub fn read_bin_file<P: AsRef<Path>>(path: P) -> NimsResult<BinFile> {
    let file = File::open(path)?;
    BinReader::new(file)?.read_block()
}
