use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use nims_core::{
    build_router, channel_name, read_bin_file, segments, BinHeaderExt, MseedEncoder,
    RecordEncoder, RecordPacker,
};
use nims_types::{NimsResult, SampleBlock, CHANNEL_COUNT};

use crate::{BatchReport, ConvertConfig, ConvertError, ConvertResult, PackTotals};

/// Пакетная конвертация bin файлов в Mini-SEED.
pub struct Converter {
    packer: RecordPacker,
}

impl Converter {
    /// Проверяет конфигурацию и создаёт маршрутизатор выходных файлов.
    ///
    /// Ни один входной файл при этом не открывается.
    pub fn new(config: &ConvertConfig) -> ConvertResult<Self> {
        Self::with_encoder(config, Box::new(MseedEncoder::new()))
    }

    /// Конвертер с другим кодировщиком записей.
    pub fn with_encoder(
        config: &ConvertConfig,
        encoder: Box<dyn RecordEncoder>,
    ) -> ConvertResult<Self> {
        config.validate()?;

        let router = build_router(config.output_mode(), config.output_dir.as_deref());

        Ok(Self {
            packer: RecordPacker::with_encoder(config.pack_params(), encoder, router),
        })
    }

    /// Конвертирует один входной файл.
    ///
    /// Размер данных и время начала проверяются до разбиения на участки.
    /// Потоки, живущие в пределах файла, закрываются и при ошибке.
    pub fn convert_file(
        &mut self,
        path: &Path,
    ) -> NimsResult<PackTotals> {
        let name = path.display();
        let file = read_bin_file(path)?;
        let header = &file.header;

        debug!("[{name}] Missing data flag (value): {}", header.missing_data_flag);

        header.validate_layout(&file.block)?;

        let start = header.start_datetime()?;
        let rate = header.sample_rate();
        let nscans = header.nscans as usize;

        info!(
            "[{name}] Start time: {start}, sample rate {rate:.3} Hz for {nscans} data scans"
        );

        let mut totals = PackTotals::default();
        let mut result = Ok(());

        for channel in 1..=CHANNEL_COUNT as u8 {
            result = self.convert_channel(&file.block, channel, nscans, start, rate, &mut totals);

            if result.is_err() {
                break;
            }
        }

        let closed = self.packer.end_file();
        result?;
        closed?;

        Ok(totals)
    }

    fn convert_channel(
        &mut self,
        block: &SampleBlock,
        channel: u8,
        nscans: usize,
        start: NaiveDateTime,
        rate: f64,
        totals: &mut PackTotals,
    ) -> NimsResult<()> {
        let code = channel_name(rate, channel)?;

        debug!("Reading data for channel {channel} ({code})");

        for segment in segments(block, channel, nscans, start, rate)? {
            debug!(
                "{} samps @ {rate:.6} Hz for channel {code}, scan {}",
                segment.len(),
                segment.start_index
            );

            *totals += self.packer.pack_segment(&segment, &code, rate)?;
        }

        Ok(())
    }

    /// Обрабатывает входные файлы по порядку.
    ///
    /// Ошибка файла записывается в журнал и в отчёт, обработка продолжается
    /// со следующего файла. Ошибка закрытия выходных потоков возвращается.
    pub fn run(
        &mut self,
        inputs: &[PathBuf],
    ) -> ConvertResult<BatchReport> {
        let started = Instant::now();
        let mut report = BatchReport::default();

        for path in inputs {
            debug!("Reading {}", path.display());

            match self.convert_file(path) {
                Ok(totals) => {
                    report.totals += totals;
                    report.converted.push(path.clone());
                }
                Err(e) => {
                    let err = ConvertError::input(path, e);
                    error!("{err}");
                    report.failed.push((path.clone(), err.to_string()));
                }
            }
        }

        self.packer.finish()?;
        report.duration = started.elapsed();

        info!(
            "Packed {} samples into {} records",
            report.totals.samples, report.totals.records
        );

        if report.has_failures() {
            warn!(
                "{} of {} input files failed",
                report.failed.len(),
                inputs.len()
            );
        }

        Ok(report)
    }
}
