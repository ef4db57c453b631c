use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Random-access view over an archive held in memory.
///
/// Reads never move a cursor; every call names its own absolute offset, so
/// string tables can be consulted in the middle of walking another table.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader { data }
    }

    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn read_bytes(&self, offset: u64, len: u64) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.len())
            .ok_or(Error::TruncatedArchive {
                offset,
                len,
                size: self.len(),
            })?;

        Ok(&self.data[offset as usize..end as usize])
    }

    #[inline(always)]
    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    #[inline(always)]
    pub fn read_u16_le_signed(&self, offset: u64) -> Result<i16> {
        self.read_bytes(offset, 2).map(LittleEndian::read_i16)
    }

    #[inline(always)]
    pub fn read_u24_le(&self, offset: u64) -> Result<u32> {
        self.read_bytes(offset, 3).map(LittleEndian::read_u24)
    }

    #[inline(always)]
    pub fn read_u32_le(&self, offset: u64) -> Result<u32> {
        self.read_bytes(offset, 4).map(LittleEndian::read_u32)
    }

    #[inline(always)]
    pub fn read_i32_le(&self, offset: u64) -> Result<i32> {
        self.read_bytes(offset, 4).map(LittleEndian::read_i32)
    }

    #[inline(always)]
    pub fn read_u64_le(&self, offset: u64) -> Result<u64> {
        self.read_bytes(offset, 8).map(LittleEndian::read_u64)
    }

    /// Reads a null-terminated string, one character per byte.
    pub fn read_cstring(&self, offset: u64) -> Result<String> {
        let truncated = |len| Error::TruncatedArchive {
            offset,
            len,
            size: self.len(),
        };

        if offset >= self.len() {
            return Err(truncated(1));
        }

        let tail = &self.data[offset as usize..];
        let end = tail
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| truncated(tail.len() as u64 + 1))?;

        Ok(tail[..end].iter().copied().map(char::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn fixed_width_reads() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xfe, 0xff, 0x01, 0x02, 0x03];
        let reader = ByteReader::new(&data);

        assert_eq!(reader.read_u32_le(0).unwrap(), 0x1234_5678);
        assert_eq!(reader.read_u16_le_signed(4).unwrap(), -2);
        assert_eq!(reader.read_u24_le(6).unwrap(), 0x03_0201);
        assert_eq!(reader.read_i32_le(3).unwrap(), 0x01ff_fe12);
        assert_eq!(reader.read_bytes(8, 1).unwrap(), &[0x03]);
        assert_eq!(reader.read_bytes(9, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn reads_past_end_are_truncated() {
        let data = [0u8; 6];
        let reader = ByteReader::new(&data);

        let err = reader.read_u32_le(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedArchive);
        match err {
            Error::TruncatedArchive { offset, len, size } => {
                assert_eq!((offset, len, size), (4, 4, 6));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(reader.read_bytes(u64::MAX, 2).is_err());
    }

    #[test]
    fn cstring_at_random_offsets() {
        let data = b"\0ASSETS\0a.txt\0\xe9t\xe9\0";
        let reader = ByteReader::new(data);

        assert_eq!(reader.read_cstring(8).unwrap(), "a.txt");
        assert_eq!(reader.read_cstring(1).unwrap(), "ASSETS");
        assert_eq!(reader.read_cstring(0).unwrap(), "");
        assert_eq!(reader.read_cstring(4).unwrap(), "ETS");
        assert_eq!(reader.read_cstring(14).unwrap(), "\u{e9}t\u{e9}");
    }

    #[test]
    fn unterminated_cstring() {
        let reader = ByteReader::new(b"abc");
        assert_eq!(
            reader.read_cstring(1).unwrap_err().kind(),
            ErrorKind::TruncatedArchive
        );
        assert_eq!(
            reader.read_cstring(3).unwrap_err().kind(),
            ErrorKind::TruncatedArchive
        );
    }
}
