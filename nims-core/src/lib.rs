//! Библиотека конвертера NIMS → Mini-SEED
//!
//! Чтение bin файлов магнитотеллурической станции NIMS, разбиение пяти
//! каналов на непрерывные участки и упаковка участков в записи Mini-SEED 2.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use nims_core::{
//!     build_router, channel_name, read_bin_file, segments, BinHeaderExt, OutputMode,
//!     PackParams, RecordPacker,
//! };
//!
//! let file = read_bin_file("ORF08.bin")?;
//! file.header.validate_layout(&file.block)?;
//!
//! let rate = file.header.sample_rate();
//! let start = file.header.start_datetime()?;
//! let router = build_router(OutputMode::Consolidated, None);
//! let mut packer = RecordPacker::new(PackParams::default(), router);
//!
//! for channel in 1..=5u8 {
//!     let name = channel_name(rate, channel)?;
//!     for seg in segments(&file.block, channel, file.header.nscans as usize, start, rate)? {
//!         packer.pack_segment(&seg, &name, rate)?;
//!     }
//! }
//! packer.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod channel;
pub mod format;
pub mod mseed;
pub mod packer;
pub mod router;
pub mod segment;
pub mod serialization;

pub use channel::*;
pub use format::*;
pub use mseed::{MseedEncoder, PackStats, RecordEncoder, RecordTemplate};
pub use packer::*;
pub use router::*;
pub use segment::*;
pub use serialization::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
