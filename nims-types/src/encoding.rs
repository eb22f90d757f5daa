/// Кодировка данных Mini-SEED, поддерживаемые конвертером
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Encoding {
    /// 32-битные целые без сжатия
    Int32 = 3,
    /// Steim-1: разности 8/16/32 бит
    Steim1 = 10,
    /// Steim-2: разности от 4 до 30 бит (по умолчанию)
    #[default]
    Steim2 = 11,
}

impl Encoding {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Encoding::Int32 => write!(f, "INT32"),
            Encoding::Steim1 => write!(f, "STEIM1"),
            Encoding::Steim2 => write!(f, "STEIM2"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "3" | "int32" | "i32" => Ok(Encoding::Int32),
            "10" | "steim1" => Ok(Encoding::Steim1),
            "11" | "steim2" => Ok(Encoding::Steim2),
            _ => Err(format!(
                "Unsupported encoding type: '{s}'. Use: 3 (int32), 10 (steim1), 11 (steim2)"
            )),
        }
    }
}
