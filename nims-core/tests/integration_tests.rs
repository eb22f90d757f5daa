use std::{fs, path::Path};

use nims_core::{
    build_router, channel_name, mseed::rate_from_factor_multiplier, read_bin_file, segments,
    BinHeaderExt, BinWriter, OutputMode, OutputTarget, PackParams, RecordPacker,
};
use nims_types::{BinHeader, Encoding, Endianness, NimsError, SampleBlock, CHANNEL_COUNT};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tempfile::{tempdir, NamedTempFile};

// ===========================================================================
// Helpers — детерминированные тест-данные
// ===========================================================================

const MISSING: i32 = -999_999;

fn header(nscans: i32) -> BinHeader {
    let mut h = BinHeader::new(1.0, [2008, 7, 8, 12, 0, 0], nscans, MISSING);
    h.latitude = 44.1;
    h.longitude = -121.3;
    h
}

/// Синтетический ряд: случайное блуждание по каждому каналу.
fn waveform(
    nscans: usize,
    seed: u64,
) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut last = [0i32; CHANNEL_COUNT];
    let mut raw = Vec::with_capacity(nscans * CHANNEL_COUNT);

    for _ in 0..nscans {
        for v in last.iter_mut() {
            *v += rng.gen_range(-500..=500);
            raw.push(*v);
        }
    }
    raw
}

fn write_bin(
    path: &Path,
    header: &BinHeader,
    raw: &[i32],
    order: Endianness,
) {
    let file = fs::File::create(path).unwrap();
    let mut writer = BinWriter::new(file, order);
    writer.write_header(header).unwrap();
    writer.write_data(raw).unwrap();
    writer.finish().unwrap();
}

/// Читает заголовки записей Mini-SEED: (количество выборок, фактор, множитель).
fn record_headers(
    bytes: &[u8],
    record_len: usize,
) -> Vec<(u16, i16, i16)> {
    bytes
        .chunks(record_len)
        .map(|r| {
            (
                u16::from_be_bytes([r[30], r[31]]),
                i16::from_be_bytes([r[32], r[33]]),
                i16::from_be_bytes([r[34], r[35]]),
            )
        })
        .collect()
}

// ===========================================================================
// Чтение
// ===========================================================================

#[test]
fn test_bin_file_roundtrip_both_orders() {
    let raw = waveform(50, 1);

    for order in [Endianness::Little, Endianness::Big] {
        let tmp = NamedTempFile::new().unwrap();
        write_bin(tmp.path(), &header(50), &raw, order);

        let file = read_bin_file(tmp.path()).unwrap();
        assert_eq!(file.header.byte_order, order);
        assert_eq!(file.header.nscans, 50);
        assert_eq!(file.block.to_raw(MISSING), raw);
        file.header.validate_layout(&file.block).unwrap();
    }
}

#[test]
fn test_data_size_mismatch_rejected() {
    let tmp = NamedTempFile::new().unwrap();
    // Заголовок объявляет 60 сканов, данных на 50
    write_bin(tmp.path(), &header(60), &waveform(50, 2), Endianness::Little);

    let file = read_bin_file(tmp.path()).unwrap();
    let err = file.header.validate_layout(&file.block).unwrap_err();

    assert!(matches!(err, NimsError::FormatViolation(_)));
}

#[test]
fn test_truncated_file() {
    let tmp = NamedTempFile::new().unwrap();
    write_bin(tmp.path(), &header(50), &waveform(50, 3), Endianness::Big);

    let bytes = fs::read(tmp.path()).unwrap();
    fs::write(tmp.path(), &bytes[..bytes.len() - 100]).unwrap();

    assert!(matches!(
        read_bin_file(tmp.path()),
        Err(NimsError::Read { field: "data", .. })
    ));
}

// ===========================================================================
// Разбиение и упаковка
// ===========================================================================

#[test]
fn test_conservation_of_samples() {
    let nscans = 400;
    let mut raw = waveform(nscans, 4);
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..60 {
        let idx = rng.gen_range(0..raw.len());
        raw[idx] = if idx % 3 == 0 { i32::MAX } else { MISSING };
    }

    let expected = raw
        .iter()
        .filter(|&&v| v != MISSING && v < i32::MAX)
        .count();

    let block = SampleBlock::from_raw(&raw, MISSING);
    let h = header(nscans as i32);
    let start = h.start_datetime().unwrap();
    let dir = tempdir().unwrap();
    let out = dir.path().join("all.mseed");

    let params = PackParams {
        station: "ORF08".into(),
        record_len: 512,
        ..Default::default()
    };
    let mut packer = RecordPacker::new(
        params,
        build_router(OutputMode::Single(OutputTarget::Path(out.clone())), None),
    );

    let mut packed = 0;
    let mut records = 0;

    for channel in 1..=5u8 {
        let name = channel_name(h.sample_rate(), channel).unwrap();
        for seg in segments(&block, channel, nscans, start, h.sample_rate()).unwrap() {
            let stats = packer.pack_segment(&seg, &name, h.sample_rate()).unwrap();
            packed += stats.samples;
            records += stats.records;
        }
    }
    packer.finish().unwrap();

    assert_eq!(packed, expected);

    let bytes = fs::read(&out).unwrap();
    assert_eq!(bytes.len(), records * 512);

    let headers = record_headers(&bytes, 512);
    let total: usize = headers.iter().map(|(n, _, _)| *n as usize).sum();
    assert_eq!(total, expected);
    assert!(headers.iter().all(|&(_, f, m)| (f, m) == (1, 1)));
}

#[test]
fn test_per_channel_files_from_bin() {
    let nscans = 100;
    let mut raw = waveform(nscans, 6);
    // Скан 10, канал 1 (LFN) отсутствует
    raw[10 * CHANNEL_COUNT] = MISSING;

    let tmp = NamedTempFile::new().unwrap();
    write_bin(tmp.path(), &header(nscans as i32), &raw, Endianness::Big);
    let file = read_bin_file(tmp.path()).unwrap();

    let dir = tempdir().unwrap();
    let params = PackParams {
        station: "ORF08".into(),
        encoding: Encoding::Steim1,
        ..Default::default()
    };
    let mut packer = RecordPacker::new(params, build_router(OutputMode::PerChannel, Some(dir.path())));

    let rate = file.header.sample_rate();
    let start = file.header.start_datetime().unwrap();

    for channel in 1..=5u8 {
        let name = channel_name(rate, channel).unwrap();
        for seg in segments(&file.block, channel, nscans, start, rate).unwrap() {
            packer.pack_segment(&seg, &name, rate).unwrap();
        }
    }
    packer.finish().unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "EM.ORF08.2008-07-08T12:00:00.LFE",
            "EM.ORF08.2008-07-08T12:00:00.LFN",
            "EM.ORF08.2008-07-08T12:00:00.LFZ",
            "EM.ORF08.2008-07-08T12:00:00.LQE",
            "EM.ORF08.2008-07-08T12:00:00.LQN",
            "EM.ORF08.2008-07-08T12:00:11.LFN",
        ]
    );

    let second = fs::read(dir.path().join("EM.ORF08.2008-07-08T12:00:11.LFN")).unwrap();
    assert_eq!(second.len(), 4096);
    assert_eq!(u16::from_be_bytes([second[30], second[31]]), 89);
    assert_eq!(&second[52..54], &[10, 1]);
}

#[test]
fn test_consolidated_files_per_start_time() {
    let nscans = 100;
    let mut raw = waveform(nscans, 8);
    // Скан 10, канал 1 (LFN) отсутствует: второй участок LFN начинается в 12:00:11
    raw[10 * CHANNEL_COUNT] = MISSING;

    let block = SampleBlock::from_raw(&raw, MISSING);
    let h = header(nscans as i32);
    let start = h.start_datetime().unwrap();
    let rate = h.sample_rate();

    let dir = tempdir().unwrap();
    let params = PackParams {
        station: "ORF08".into(),
        record_len: 512,
        ..Default::default()
    };
    let mut packer = RecordPacker::new(params, build_router(OutputMode::Consolidated, Some(dir.path())));

    for channel in 1..=5u8 {
        let name = channel_name(rate, channel).unwrap();
        for seg in segments(&block, channel, nscans, start, rate).unwrap() {
            packer.pack_segment(&seg, &name, rate).unwrap();
        }
    }
    packer.end_file().unwrap();
    packer.finish().unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();

    assert_eq!(
        names,
        vec!["EM.ORF08.2008-07-08T12:00:00", "EM.ORF08.2008-07-08T12:00:11"]
    );

    let count = |name: &str| -> usize {
        let bytes = fs::read(dir.path().join(name)).unwrap();
        record_headers(&bytes, 512)
            .iter()
            .map(|(n, _, _)| *n as usize)
            .sum()
    };

    assert_eq!(count("EM.ORF08.2008-07-08T12:00:11"), 89);
    assert_eq!(count("EM.ORF08.2008-07-08T12:00:00"), 10 + 4 * nscans);
}

#[test]
fn test_fractional_rate_header() {
    // dt = 0.4 с: частота 2.5 Гц, целого периода нет
    let mut h = header(20);
    h.dt = 0.4;
    let block = SampleBlock::from_raw(&waveform(20, 7), MISSING);
    let start = h.start_datetime().unwrap();
    let rate = h.sample_rate();

    let tmp = NamedTempFile::new().unwrap();
    let mut packer = RecordPacker::new(
        PackParams {
            record_len: 256,
            ..Default::default()
        },
        build_router(
            OutputMode::Single(OutputTarget::Path(tmp.path().to_path_buf())),
            None,
        ),
    );

    for seg in segments(&block, 1, 20, start, rate).unwrap() {
        packer
            .pack_segment(&seg, &channel_name(rate, 1).unwrap(), rate)
            .unwrap();
    }
    packer.finish().unwrap();

    let bytes = fs::read(tmp.path()).unwrap();
    let (_, f, m) = record_headers(&bytes, 256)[0];

    assert_eq!(channel_name(rate, 1).unwrap(), "MFN");
    assert!((rate_from_factor_multiplier(f, m) - rate).abs() < 1e-4);
}

#[test]
fn test_long_period_channel_packs() {
    // dt = 50000 с: P-диапазон, период не помещается в один множитель
    let mut h = header(20);
    h.dt = 50000.0;
    let block = SampleBlock::from_raw(&waveform(20, 9), MISSING);
    let start = h.start_datetime().unwrap();
    let rate = h.sample_rate();
    let name = channel_name(rate, 1).unwrap();

    let tmp = NamedTempFile::new().unwrap();
    let mut packer = RecordPacker::new(
        PackParams {
            record_len: 256,
            blockette_100: true,
            ..Default::default()
        },
        build_router(
            OutputMode::Single(OutputTarget::Path(tmp.path().to_path_buf())),
            None,
        ),
    );

    for seg in segments(&block, 1, 20, start, rate).unwrap() {
        let stats = packer.pack_segment(&seg, &name, rate).unwrap();
        assert_eq!(stats.samples, 20);
    }
    packer.finish().unwrap();

    let bytes = fs::read(tmp.path()).unwrap();
    let (n, f, m) = record_headers(&bytes, 256)[0];

    assert_eq!(name, "PFN");
    assert_eq!(n, 20);
    assert_eq!((f, m), (-25000, -2));
    // Blockette 100 сразу за blockette 1000
    assert_eq!(u16::from_be_bytes([bytes[56], bytes[57]]), 100);
    assert_eq!(
        f32::from_be_bytes([bytes[60], bytes[61], bytes[62], bytes[63]]),
        rate as f32
    );
}
