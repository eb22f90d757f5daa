/// Порядок байт многобайтовых полей
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Endianness {
    /// Младший байт первым (LSBF)
    Little = 0,
    /// Старший байт первым (MSBF), по умолчанию для Mini-SEED
    #[default]
    Big = 1,
}

impl Endianness {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Порядок байт текущей платформы.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }
}

impl std::fmt::Display for Endianness {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Endianness::Little => write!(f, "little-endian"),
            Endianness::Big => write!(f, "big-endian"),
        }
    }
}
