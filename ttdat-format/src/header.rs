use crate::{
    error::{Error, Result},
    reader::ByteReader,
};

/// First word of every `.FPK` file.
pub const FPK_MAGIC: u32 = 0x1234_5678;

/// What the leading word of a file says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Fpk,

    /// The leading word of a `.DAT` is the offset of its file-info table.
    Dat { file_info_offset: u32 },
}

impl ContainerKind {
    pub fn detect(reader: &ByteReader<'_>) -> Result<ContainerKind> {
        let first_word = reader.read_u32_le(0)?;

        if first_word == FPK_MAGIC {
            Ok(ContainerKind::Fpk)
        } else if u64::from(first_word) < reader.len() {
            Ok(ContainerKind::Dat {
                file_info_offset: first_word,
            })
        } else {
            Err(Error::UnrecognizedContainer {
                first_word,
                size: reader.len(),
            })
        }
    }
}
