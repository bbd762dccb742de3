//! Fixed-width little-endian field codecs for slot payloads.

/// A value that can be stored at a byte offset inside a record.
pub trait FieldValue: Copy {
    /// Number of bytes the value occupies.
    const WIDTH: usize;

    /// Reads the value from the first `WIDTH` bytes of `src`.
    fn read_from(src: &[u8]) -> Self;

    /// Writes the value into the first `WIDTH` bytes of `dst`.
    fn write_to(self, dst: &mut [u8]);
}

macro_rules! le_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const WIDTH: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn read_from(src: &[u8]) -> Self {
                    let mut bytes = [0u8; core::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&src[..Self::WIDTH]);
                    <$ty>::from_le_bytes(bytes)
                }

                #[inline]
                fn write_to(self, dst: &mut [u8]) {
                    dst[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

le_field!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl FieldValue for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn read_from(src: &[u8]) -> Self {
        src[0] != 0
    }

    #[inline]
    fn write_to(self, dst: &mut [u8]) {
        dst[0] = u8::from(self);
    }
}
