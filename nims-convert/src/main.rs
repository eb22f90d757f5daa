use std::path::PathBuf;

use clap::{error::ErrorKind, ArgAction, Parser};
use log::{error, info, LevelFilter};
use nims_convert::{
    expand_inputs, parse_byte_order, parse_encoding, parse_record_length, ConvertConfig,
    Converter, DEFAULT_NETWORK,
};
use nims_types::{Encoding, Endianness};

#[derive(Parser, Debug)]
#[command(
    name = "nims2mseed",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert NIMS magnetotelluric bin files to Mini-SEED",
    long_about = None,
)]
struct Cli {
    /// Подробный вывод (повторять для большей детализации)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
    /// Добавлять blockette 100 с частотой дискретизации
    #[arg(short = 'S', long = "srate-blockette")]
    blockette_100: bool,
    /// Отдельный файл на каждый участок канала
    #[arg(short = 'C', long = "channel-files")]
    per_channel: bool,
    /// Код сети
    #[arg(short, long, default_value = DEFAULT_NETWORK)]
    network: String,
    /// Код станции
    #[arg(short, long, default_value = "")]
    station: String,
    /// Код локации
    #[arg(short, long, default_value = "")]
    location: String,
    /// Длина записи в байтах (степень двойки, 256..=65536)
    #[arg(short = 'r', long = "record-length", default_value = "4096", value_parser = parse_record_length)]
    record_len: usize,
    /// Кодирование: 3 (int32), 10 (steim1), 11 (steim2)
    #[arg(short, long, default_value = "11", value_parser = parse_encoding)]
    encoding: Encoding,
    /// Порядок байт: 0 little-endian, 1 big-endian
    #[arg(short = 'b', long = "byte-order", default_value = "1", value_parser = parse_byte_order)]
    byte_order: Endianness,
    /// Единственный выходной файл (`-` для stdout)
    #[arg(short, long, allow_hyphen_values = true)]
    output: Option<String>,
    /// Каталог для сгенерированных имён файлов
    #[arg(short = 'd', long = "output-dir")]
    output_dir: Option<PathBuf>,
    /// Входные bin файлы; `@file` читает список файлов
    #[arg(required = true)]
    inputs: Vec<String>,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }

        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn config(&self) -> ConvertConfig {
        ConvertConfig {
            network: self.network.clone(),
            station: self.station.clone(),
            location: self.location.clone(),
            encoding: self.encoding,
            record_len: self.record_len,
            byte_order: self.byte_order,
            blockette_100: self.blockette_100,
            per_channel: self.per_channel,
            output_file: self.output.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let config = cli.config();

    let mut converter = match Converter::new(&config) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    info!("nims2mseed version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Network {}, station {}, {} encoding, {} byte records, {}",
        config.network,
        if config.station.is_empty() { "-" } else { config.station.as_str() },
        config.encoding,
        config.record_len,
        config.byte_order
    );

    let inputs = expand_inputs(&cli.inputs);

    if inputs.is_empty() {
        error!("No input files were specified");
        std::process::exit(1);
    }

    match converter.run(&inputs) {
        Ok(report) => info!("\n{}", report.summary()),
        Err(e) => {
            error!("Conversion failed: {e}");
            std::process::exit(1);
        }
    }
}
