//! Endian-aware integer reads out of raw kernel records.

pub trait BitWidth: Sized {
    fn from_bytes(bytes: &[u8], endian: impl object::Endian) -> Option<Self>;
}

impl BitWidth for u32 {
    fn from_bytes(bytes: &[u8], endian: impl object::Endian) -> Option<Self> {
        let (head, _) = bytes.split_first_chunk::<4>()?;
        Some(endian.read_u32_bytes(*head))
    }
}

impl BitWidth for i32 {
    fn from_bytes(bytes: &[u8], endian: impl object::Endian) -> Option<Self> {
        u32::from_bytes(bytes, endian).map(|v| v as i32)
    }
}

pub trait EndiannessExt {
    /// Read a `T` at byte offset `at` of `data`.
    ///
    /// Returns `None` if fewer than `size_of::<T>()` bytes remain past `at`.
    fn read_at<T: BitWidth>(&self, data: &[u8], at: usize) -> Option<T>;
}

impl<E: object::Endian> EndiannessExt for E {
    fn read_at<T: BitWidth>(&self, data: &[u8], at: usize) -> Option<T> {
        T::from_bytes(data.get(at..)?, *self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object::{BigEndian, LittleEndian};

    #[test]
    fn read_at_offsets() {
        let bytes = [0u8, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 7, 0];
        assert_eq!(LittleEndian.read_at::<i32>(&bytes, 1), Some(-1));
        assert_eq!(BigEndian.read_at::<u32>(&bytes, 5), Some(7));
        assert_eq!(LittleEndian.read_at::<u32>(&bytes, 5), Some(0x0700_0000));
        assert_eq!(LittleEndian.read_at::<u32>(&bytes, 7), None);
        assert_eq!(LittleEndian.read_at::<u32>(&bytes, 100), None);
    }
}
