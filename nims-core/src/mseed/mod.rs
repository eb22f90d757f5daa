//! Кодирование участков данных в записи Mini-SEED 2.

pub mod rate;
pub mod record;
pub mod steim;

use std::{io::Write, ops::AddAssign};

use nims_types::NimsResult;

pub use rate::*;
pub use record::*;
pub use steim::{encode_steim, SteimVersion, FRAME_SIZE};

/// Счётчики упаковки одного вызова кодировщика.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackStats {
    pub samples: usize,
    pub records: usize,
}

impl AddAssign for PackStats {
    fn add_assign(
        &mut self,
        rhs: Self,
    ) {
        self.samples += rhs.samples;
        self.records += rhs.records;
    }
}

/// Кодировщик записей фиксированной длины.
///
/// Запись передаётся в `sink` только после полного кодирования. При ошибке
/// уже записанные записи остаются в потоке.
pub trait RecordEncoder {
    fn encode(
        &mut self,
        template: &RecordTemplate,
        samples: &[i32],
        sink: &mut dyn Write,
    ) -> NimsResult<PackStats>;
}
