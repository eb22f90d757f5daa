use chrono::NaiveDateTime;
use nims_types::{NimsError, NimsResult, SampleBlock, CHANNEL_COUNT};

use crate::format::scan_time;

/// Непрерывный участок одного канала без отсутствующих выборок.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Индекс канала 1..=5
    pub channel: u8,
    /// Индекс скана первой выборки
    pub start_index: usize,
    /// Время первой выборки
    pub start_time: NaiveDateTime,
    pub samples: Vec<i32>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Ленивый итератор сегментов канала.
///
/// Отсутствующая выборка закрывает текущий участок и пропускается, пустые
/// участки не выдаются.
pub struct Segments<'a> {
    block: &'a SampleBlock,
    channel: u8,
    nscans: usize,
    start: NaiveDateTime,
    sample_rate: f64,
    scan: usize,
}

/// Создаёт итератор сегментов канала `channel` в блоке `block`.
///
/// Время скана `nscans` должно быть представимо, иначе
/// [`NimsError::FormatViolation`].
pub fn segments(
    block: &SampleBlock,
    channel: u8,
    nscans: usize,
    start: NaiveDateTime,
    sample_rate: f64,
) -> NimsResult<Segments<'_>> {
    if channel == 0 || channel as usize > CHANNEL_COUNT {
        return Err(NimsError::UnsupportedChannelIndex(channel));
    }

    scan_time(start, nscans, sample_rate)?;

    Ok(Segments {
        block,
        channel,
        nscans,
        start,
        sample_rate,
        scan: 0,
    })
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        // Пропускаем отсутствующие выборки до начала участка
        while self.scan < self.nscans && self.block.get(self.scan, self.channel).is_none() {
            self.scan += 1;
        }

        if self.scan >= self.nscans {
            return None;
        }

        let start_index = self.scan;
        let mut samples = Vec::new();

        while self.scan < self.nscans {
            match self.block.get(self.scan, self.channel) {
                Some(v) => samples.push(v),
                None => break,
            }
            self.scan += 1;
        }

        // Граница nscans проверена в segments()
        let start_time = scan_time(self.start, start_index, self.sample_rate).ok()?;

        Some(Segment {
            channel: self.channel,
            start_index,
            start_time,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2008, 7, 8)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn block_with(
        nscans: usize,
        missing: &[(usize, u8)],
        value: i32,
    ) -> SampleBlock {
        let mut raw: Vec<i32> = (0..nscans * CHANNEL_COUNT).map(|i| i as i32).collect();
        for &(scan, ch) in missing {
            raw[scan * CHANNEL_COUNT + ch as usize - 1] = value;
        }
        SampleBlock::from_raw(&raw, -999)
    }

    #[test]
    fn test_sentinel_splits_run() {
        let block = block_with(100, &[(10, 2)], -999);
        let segs: Vec<_> = segments(&block, 2, 100, start(), 1.0).unwrap().collect();

        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].start_index, 0);
        assert_eq!(segs[0].len(), 10);
        assert_eq!(segs[1].start_index, 11);
        assert_eq!(segs[1].len(), 89);
        assert_eq!(segs[0].start_time, start());
        assert_eq!(segs[1].start_time, start() + Duration::seconds(11));
        assert_eq!(segs[1].samples[0], (11 * 5 + 1) as i32);

        // Другие каналы не затронуты
        assert_eq!(segments(&block, 1, 100, start(), 1.0).unwrap().count(), 1);
    }

    #[test]
    fn test_all_missing_yields_nothing() {
        let missing: Vec<_> = (0..20).map(|s| (s, 4)).collect();
        let block = block_with(20, &missing, -999);

        assert_eq!(segments(&block, 4, 20, start(), 1.0).unwrap().count(), 0);
    }

    #[test]
    fn test_overflow_treated_as_missing() {
        let block = block_with(10, &[(0, 1), (1, 1), (5, 1), (9, 1)], i32::MAX);
        let segs: Vec<_> = segments(&block, 1, 10, start(), 4.0).unwrap().collect();

        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].start_index, segs[0].len()), (2, 3));
        assert_eq!((segs[1].start_index, segs[1].len()), (6, 3));
        assert_eq!(segs[1].start_time, start() + Duration::milliseconds(1500));
    }

    #[test]
    fn test_consecutive_missing_no_empty_segments() {
        let block = block_with(8, &[(3, 5), (4, 5)], -999);
        let lens: Vec<_> = segments(&block, 5, 8, start(), 1.0)
            .unwrap()
            .map(|s| s.len())
            .collect();

        assert_eq!(lens, vec![3, 3]);
    }

    #[test]
    fn test_invalid_channel() {
        let block = block_with(1, &[], 0);

        assert!(segments(&block, 0, 1, start(), 1.0).is_err());
        assert!(segments(&block, 6, 1, start(), 1.0).is_err());
    }

    #[test]
    fn test_long_period_time_range() {
        // 1e-9 Гц: 100 сканов укладываются в BTIME, 10000 нет
        let block = block_with(100, &[(50, 1)], -999);
        let segs: Vec<_> = segments(&block, 1, 100, start(), 1e-9).unwrap().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].start_index, 51);

        let block = block_with(10_000, &[], 0);
        let err = segments(&block, 1, 10_000, start(), 1e-9).err().unwrap();
        assert!(err.is_format(), "{err}");
    }
}
