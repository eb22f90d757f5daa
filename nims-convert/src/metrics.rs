use std::{
    ops::AddAssign,
    path::PathBuf,
    time::Duration,
};

use nims_core::PackStats;

/// Суммарные счётчики упаковки за весь запуск.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackTotals {
    pub samples: u64,
    pub records: u64,
    pub segments: u64,
}

impl AddAssign<PackStats> for PackTotals {
    fn add_assign(
        &mut self,
        rhs: PackStats,
    ) {
        self.samples += rhs.samples as u64;
        self.records += rhs.records as u64;
        self.segments += 1;
    }
}

impl AddAssign for PackTotals {
    fn add_assign(
        &mut self,
        rhs: Self,
    ) {
        self.samples += rhs.samples;
        self.records += rhs.records;
        self.segments += rhs.segments;
    }
}

/// Итог пакетной конвертации.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub totals: PackTotals,
    /// Успешно обработанные файлы
    pub converted: Vec<PathBuf>,
    /// Файлы, обработка которых прервана ошибкой, с текстом ошибки
    pub failed: Vec<(PathBuf, String)>,
    pub duration: Duration,
}

impl BatchReport {
    /// Итоговая сводка для вывода в конце запуска.
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            duration_secs: self.duration.as_secs_f64(),
            files_converted: self.converted.len(),
            files_failed: self.failed.len(),
            segments: self.totals.segments,
            samples: self.totals.samples,
            records: self.totals.records,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Snapshot итогов для отображения / тестирования.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub duration_secs: f64,
    pub files_converted: usize,
    pub files_failed: usize,
    pub segments: u64,
    pub samples: u64,
    pub records: u64,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(
            f,
            "  Files         : {} converted, {} failed",
            self.files_converted, self.files_failed
        )?;
        writeln!(f, "  Segments      : {}", self.segments)?;
        writeln!(f, "  Samples       : {}", self.samples)?;
        writeln!(f, "  Records       : {}", self.records)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_accumulate() {
        let mut totals = PackTotals::default();
        totals += PackStats { samples: 100, records: 2 };
        totals += PackStats { samples: 50, records: 1 };

        assert_eq!(totals, PackTotals { samples: 150, records: 3, segments: 2 });

        let mut all = PackTotals::default();
        all += totals;
        all += totals;
        assert_eq!(all.samples, 300);
        assert_eq!(all.segments, 4);
    }

    #[test]
    fn test_summary_snapshot() {
        let report = BatchReport {
            totals: PackTotals { samples: 10, records: 1, segments: 1 },
            converted: vec![PathBuf::from("a.bin")],
            failed: vec![(PathBuf::from("b.bin"), "Header error".into())],
            duration: Duration::from_millis(1500),
        };
        let summary = report.summary();

        assert!(report.has_failures());
        assert_eq!(summary.files_converted, 1);
        assert_eq!(summary.files_failed, 1);
        assert_eq!(summary.duration_secs, 1.5);

        let text = summary.to_string();
        assert!(text.contains("1 converted, 1 failed"));
        assert!(text.contains("Records       : 1"));
    }
}
