use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, warn};

/// Префикс аргумента, обозначающий файл со списком входных файлов
pub const LIST_FILE_PREFIX: char = '@';

/// Наибольшее количество полей в строке списка
const MAX_LIST_FIELDS: usize = 3;

/// Разворачивает аргументы в упорядоченный список входных файлов.
///
/// Обычные пути сохраняют порядок; содержимое списков `@path` добавляется
/// в конец в порядке следования списков. Нечитаемый список пропускается.
pub fn expand_inputs<S: AsRef<str>>(args: &[S]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut listed = Vec::new();

    for arg in args {
        let arg = arg.as_ref();

        match arg.strip_prefix(LIST_FILE_PREFIX) {
            Some(list) => match read_list_file(Path::new(list)) {
                Ok(mut entries) => listed.append(&mut entries),
                Err(e) => warn!("Cannot read list file {list}: {e}"),
            },
            None => files.push(PathBuf::from(arg)),
        }
    }

    files.extend(listed);
    files
}

/// Читает список входных файлов.
///
/// Строка обрезается по первому CR или LF и делится на поля пробелами.
/// Строки с 1–3 полями добавляют последнее поле, остальные пропускаются.
pub fn read_list_file(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);

    debug!("Reading list of input files from {}", path.display());

    let entries = text
        .split('\n')
        .filter_map(|line| {
            let line = line.split('\r').next().unwrap_or_default();
            let fields: Vec<&str> = line.split(' ').filter(|f| !f.is_empty()).collect();

            match fields.len() {
                1..=MAX_LIST_FIELDS => fields.last().map(|f| {
                    debug!("Adding '{f}' to input file list");
                    PathBuf::from(f)
                }),
                _ => None,
            }
        })
        .collect();

    Ok(entries)
}
