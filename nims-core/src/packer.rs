use log::debug;
use nims_types::{Encoding, Endianness, NimsResult};

use crate::{
    mseed::{MseedEncoder, PackStats, RecordEncoder, RecordTemplate, DEFAULT_RECORD_LEN},
    router::{OutputRouter, StreamKey},
    segment::Segment,
};

/// Наибольшая длина кодов сети, станции и локации
pub const NETWORK_CODE_LEN: usize = 2;
pub const STATION_CODE_LEN: usize = 5;
pub const LOCATION_CODE_LEN: usize = 2;

/// Параметры упаковки, общие для всех участков.
#[derive(Debug, Clone, PartialEq)]
pub struct PackParams {
    pub network: String,
    pub station: String,
    pub location: String,
    pub encoding: Encoding,
    pub record_len: usize,
    pub byte_order: Endianness,
    pub blockette_100: bool,
}

impl Default for PackParams {
    fn default() -> Self {
        Self {
            network: "EM".into(),
            station: String::new(),
            location: String::new(),
            encoding: Encoding::default(),
            record_len: DEFAULT_RECORD_LEN,
            byte_order: Endianness::default(),
            blockette_100: false,
        }
    }
}

impl PackParams {
    /// Приводит коды к допустимой длине и удаляет пробелы.
    pub fn cleaned(mut self) -> Self {
        self.network = clean_code(&self.network, NETWORK_CODE_LEN);
        self.station = clean_code(&self.station, STATION_CODE_LEN);
        self.location = clean_code(&self.location, LOCATION_CODE_LEN);
        self
    }

    /// Шаблон записей для участка канала `channel`.
    pub fn template(
        &self,
        segment: &Segment,
        channel: &str,
        sample_rate: f64,
    ) -> RecordTemplate {
        RecordTemplate {
            network: self.network.clone(),
            station: self.station.clone(),
            location: self.location.clone(),
            channel: channel.to_string(),
            start_time: segment.start_time,
            sample_rate,
            encoding: self.encoding,
            record_len: self.record_len,
            byte_order: self.byte_order,
            blockette_100: self.blockette_100,
        }
    }
}

/// Удаляет пробелы и обрезает код до `max` символов.
pub fn clean_code(
    code: &str,
    max: usize,
) -> String {
    code.chars().filter(|c| *c != ' ').take(max).collect()
}

/// Упаковывает участки в записи и направляет их в выходные потоки.
pub struct RecordPacker {
    params: PackParams,
    encoder: Box<dyn RecordEncoder>,
    router: Box<dyn OutputRouter>,
}

impl RecordPacker {
    /// Упаковщик со встроенным кодировщиком Mini-SEED 2.
    pub fn new(
        params: PackParams,
        router: Box<dyn OutputRouter>,
    ) -> Self {
        Self::with_encoder(params, Box::new(MseedEncoder::new()), router)
    }

    pub fn with_encoder(
        params: PackParams,
        encoder: Box<dyn RecordEncoder>,
        router: Box<dyn OutputRouter>,
    ) -> Self {
        Self {
            params: params.cleaned(),
            encoder,
            router,
        }
    }

    pub fn params(&self) -> &PackParams {
        &self.params
    }

    /// Упаковывает один участок.
    ///
    /// Поток участка освобождается и при ошибке кодирования; уже записанные
    /// записи остаются.
    pub fn pack_segment(
        &mut self,
        segment: &Segment,
        channel: &str,
        sample_rate: f64,
    ) -> NimsResult<PackStats> {
        let template = self.params.template(segment, channel, sample_rate);
        let key = StreamKey {
            network: template.network.clone(),
            station: template.station.clone(),
            start_time: segment.start_time,
            channel: template.channel.clone(),
        };

        let stream = self.router.stream(&key)?;
        let result = self.encoder.encode(&template, &segment.samples, stream);
        self.router.release(&key)?;
        let stats = result?;

        debug!(
            "{}.{}.{}.{}: packed {} samples into {} records, start {}",
            template.network,
            template.station,
            template.location,
            template.channel,
            stats.samples,
            stats.records,
            segment.start_time
        );

        Ok(stats)
    }

    /// Конец входного файла.
    pub fn end_file(&mut self) -> NimsResult<()> {
        self.router.end_file()
    }

    /// Сбрасывает все выходные потоки.
    pub fn finish(&mut self) -> NimsResult<()> {
        self.router.finish()
    }
}
