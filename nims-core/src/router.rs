use std::{
    collections::{hash_map::Entry, HashMap, HashSet},
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use log::debug;
use nims_types::NimsResult;

/// Формат времени в именах выходных файлов
pub const FILE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Идентификатор потока записей одного участка.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub network: String,
    pub station: String,
    pub start_time: NaiveDateTime,
    pub channel: String,
}

impl StreamKey {
    /// Имя файла `NET.STA.YYYY-MM-DDTHH:MM:SS`.
    pub fn consolidated_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.network,
            self.station,
            self.start_time.format(FILE_TIME_FORMAT)
        )
    }

    /// Имя файла `NET.STA.YYYY-MM-DDTHH:MM:SS.CHA`.
    pub fn channel_name(&self) -> String {
        format!("{}.{}", self.consolidated_name(), self.channel)
    }
}

/// Куда пишется единственный выходной поток.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    Path(PathBuf),
}

impl OutputTarget {
    /// `-` означает стандартный вывод.
    pub fn parse(s: &str) -> Self {
        if s == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::Path(PathBuf::from(s))
        }
    }
}

/// Стратегия распределения записей по файлам.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Все записи в один поток
    Single(OutputTarget),
    /// Файл на каждое различное (сеть, станция, время начала участка)
    Consolidated,
    /// Отдельный файл на каждый участок канала
    PerChannel,
}

/// Выдаёт поток для записей участка.
pub trait OutputRouter {
    /// Поток для участка `key`, открывается при необходимости.
    fn stream(
        &mut self,
        key: &StreamKey,
    ) -> NimsResult<&mut dyn Write>;

    /// Участок `key` записан.
    fn release(
        &mut self,
        _key: &StreamKey,
    ) -> NimsResult<()> {
        Ok(())
    }

    /// Входной файл обработан: закрыть потоки, живущие в пределах файла.
    fn end_file(&mut self) -> NimsResult<()> {
        Ok(())
    }

    /// Конец работы: сбросить и закрыть все потоки.
    fn finish(&mut self) -> NimsResult<()>;
}

/// Создаёт маршрутизатор для режима `mode`.
///
/// Сгенерированные имена файлов размещаются в `output_dir`.
pub fn build_router(
    mode: OutputMode,
    output_dir: Option<&Path>,
) -> Box<dyn OutputRouter> {
    let dir = output_dir.map(Path::to_path_buf).unwrap_or_default();

    match mode {
        OutputMode::Single(target) => Box::new(SingleFileRouter::new(target)),
        OutputMode::Consolidated => Box::new(ConsolidatedRouter::new(dir)),
        OutputMode::PerChannel => Box::new(PerChannelRouter::new(dir)),
    }
}

/// Один поток на всё время работы.
pub struct SingleFileRouter {
    target: OutputTarget,
    writer: Option<Box<dyn Write>>,
}

impl SingleFileRouter {
    pub fn new(target: OutputTarget) -> Self {
        Self {
            target,
            writer: None,
        }
    }
}

impl OutputRouter for SingleFileRouter {
    fn stream(
        &mut self,
        _key: &StreamKey,
    ) -> NimsResult<&mut dyn Write> {
        let writer: Box<dyn Write> = match self.writer.take() {
            Some(w) => w,
            None => match &self.target {
                OutputTarget::Stdout => Box::new(BufWriter::new(io::stdout())),
                OutputTarget::Path(path) => {
                    debug!("Opening output file {}", path.display());
                    Box::new(BufWriter::new(File::create(path)?))
                }
            },
        };

        Ok(self.writer.insert(writer).as_mut())
    }

    fn finish(&mut self) -> NimsResult<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
        }
        Ok(())
    }
}

/// Открывает файл с именем `name` в `dir`: в первый раз с усечением, затем
/// на дозапись.
fn open_generated(
    dir: &Path,
    name: &str,
    created: &mut HashSet<PathBuf>,
) -> io::Result<BufWriter<File>> {
    let path = dir.join(name);
    let append = created.contains(&path);

    debug!(
        "{} output file {}",
        if append { "Appending to" } else { "Opening" },
        path.display()
    );

    let file = if append {
        OpenOptions::new().append(true).open(&path)?
    } else {
        File::create(&path)?
    };

    created.insert(path);
    Ok(BufWriter::new(file))
}

/// Поток на каждое различное (сеть, станция, время начала участка).
///
/// Участки разных каналов с одинаковым началом пишутся в один файл. Потоки
/// закрываются в конце входного файла, повторное имя дозаписывается.
pub struct ConsolidatedRouter {
    dir: PathBuf,
    open: HashMap<String, BufWriter<File>>,
    created: HashSet<PathBuf>,
}

impl ConsolidatedRouter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            open: HashMap::new(),
            created: HashSet::new(),
        }
    }
}

impl OutputRouter for ConsolidatedRouter {
    fn stream(
        &mut self,
        key: &StreamKey,
    ) -> NimsResult<&mut dyn Write> {
        let writer = match self.open.entry(key.consolidated_name()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let w = open_generated(&self.dir, e.key(), &mut self.created)?;
                e.insert(w)
            }
        };

        Ok(writer)
    }

    fn end_file(&mut self) -> NimsResult<()> {
        for (_, mut w) in self.open.drain() {
            w.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> NimsResult<()> {
        self.end_file()
    }
}

/// Отдельный файл на каждый участок, закрывается сразу после него.
pub struct PerChannelRouter {
    dir: PathBuf,
    current: Option<BufWriter<File>>,
    created: HashSet<PathBuf>,
}

impl PerChannelRouter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            current: None,
            created: HashSet::new(),
        }
    }
}

impl OutputRouter for PerChannelRouter {
    fn stream(
        &mut self,
        key: &StreamKey,
    ) -> NimsResult<&mut dyn Write> {
        let writer = match self.current.take() {
            Some(w) => w,
            None => open_generated(&self.dir, &key.channel_name(), &mut self.created)?,
        };

        Ok(self.current.insert(writer))
    }

    fn release(
        &mut self,
        _key: &StreamKey,
    ) -> NimsResult<()> {
        self.release_current()
    }

    fn finish(&mut self) -> NimsResult<()> {
        self.release_current()
    }
}

impl PerChannelRouter {
    fn release_current(&mut self) -> NimsResult<()> {
        if let Some(mut w) = self.current.take() {
            w.flush()?;
        }
        Ok(())
    }
}
