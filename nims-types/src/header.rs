use crate::Endianness;

/// Значение поля типа пропусков, при котором пропуски заполнены флагом
pub const GAP_TYPE_FILLED: i32 = 2005;

/// Заголовок NIMS bin файла (Fortran unformatted record).
///
/// Поля перечислены в порядке их следования в файле. Координаты и
/// склонение читаются только ради выравнивания и дальше не используются.
#[derive(Debug, Clone, PartialEq)]
pub struct BinHeader {
    /// Порядок байт, в котором записан файл
    pub byte_order: Endianness,
    /// Маркер длины записи заголовка (байты)
    pub record_len: i32,
    /// Широта
    pub latitude: f32,
    /// Долгота
    pub longitude: f32,
    /// Магнитное склонение
    pub declination: f32,
    /// Интервал дискретизации, секунды
    pub dt: f32,
    /// Высота
    pub elevation: f32,
    /// Начало ряда: год, месяц, день месяца, час, минута, секунда
    pub start_time: [i32; 6],
    /// Нулевое время часов прибора
    pub clock_zero: [i32; 6],
    /// Количество сканов (строк из 5 каналов)
    pub nscans: i32,
    /// Тип пропусков (ожидается [`GAP_TYPE_FILLED`])
    pub gap_type: i32,
    /// Флаг отсутствующих данных
    pub missing_data_flag: i32,
    /// Таблица пропусков, тройки int32
    pub gaps: Vec<[i32; 3]>,
    /// Количество 4-байтовых слов выравнивания в конце заголовка
    pub padding_words: usize,
}

impl BinHeader {
    /// Количество слов фиксированной части заголовка (без таблицы пропусков).
    pub const FIXED_WORDS: i32 = 21;

    /// Создаёт заголовок без пропусков и выравнивания.
    pub fn new(
        dt: f32,
        start_time: [i32; 6],
        nscans: i32,
        missing_data_flag: i32,
    ) -> Self {
        let mut header = BinHeader {
            byte_order: Endianness::Little,
            record_len: 0,
            latitude: 0.0,
            longitude: 0.0,
            declination: 0.0,
            dt,
            elevation: 0.0,
            start_time,
            clock_zero: start_time,
            nscans,
            gap_type: GAP_TYPE_FILLED,
            missing_data_flag,
            gaps: Vec::new(),
            padding_words: 0,
        };
        header.record_len = header.computed_record_len();
        header
    }

    /// Частота дискретизации, Гц (вычисляется в одинарной точности).
    pub fn sample_rate(&self) -> f64 {
        (1.0f32 / self.dt) as f64
    }

    /// Количество пропусков в таблице.
    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }

    /// Длина записи заголовка, следующая из таблицы пропусков и выравнивания.
    pub fn computed_record_len(&self) -> i32 {
        let words = Self::FIXED_WORDS as usize + 3 * self.gaps.len() + self.padding_words;
        (words * 4) as i32
    }
}
