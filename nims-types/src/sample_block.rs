/// Количество каналов в скане NIMS
pub const CHANNEL_COUNT: usize = 5;

/// Значения не меньше этого порога считаются отсутствующими
pub const OVERFLOW_SAMPLE: i32 = i32::MAX;

/// Мультиплексированный блок данных: скан `i`, канал `c` лежит по индексу
/// `5·i + c`.
///
/// Флаг отсутствующих данных уже разрешён в `None` на границе чтения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBlock {
    /// Выборки в порядке файла
    pub samples: Vec<Option<i32>>,
    /// Длина блока данных в байтах по маркеру записи
    pub byte_len: usize,
}

impl SampleBlock {
    /// Разрешает сырые значения: флаг и переполнение становятся `None`.
    pub fn from_raw(
        raw: &[i32],
        missing_data_flag: i32,
    ) -> Self {
        let samples = raw
            .iter()
            .map(|&v| {
                if v == missing_data_flag || v >= OVERFLOW_SAMPLE {
                    None
                } else {
                    Some(v)
                }
            })
            .collect();

        SampleBlock {
            samples,
            byte_len: raw.len() * 4,
        }
    }

    /// Сворачивает `None` обратно во флаг для записи в файл.
    pub fn to_raw(
        &self,
        missing_data_flag: i32,
    ) -> Vec<i32> {
        self.samples
            .iter()
            .map(|s| s.unwrap_or(missing_data_flag))
            .collect()
    }

    /// Выборка скана `scan` для канала с индексом `channel` (1..=5).
    pub fn get(
        &self,
        scan: usize,
        channel: u8,
    ) -> Option<i32> {
        if channel == 0 || channel as usize > CHANNEL_COUNT {
            return None;
        }

        let idx = CHANNEL_COUNT * scan + channel as usize - 1;
        self.samples.get(idx).copied().flatten()
    }

    /// Количество присутствующих выборок по всем каналам.
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
