pub const WIDTH: usize = 1_200;
pub const HEIGHT: usize = 1_600;

/// bytes are packed so one byte is two four-bit colors. so 600 bytes for 1200 px
pub const ROW_BYTES: usize = WIDTH.div_ceil(2);
/// Each controller chip drives one half of every row
pub const SEGMENT_BYTES: usize = ROW_BYTES.div_ceil(2);

pub const IMAGE_BYTES: usize = HEIGHT * ROW_BYTES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        assert_eq!(ROW_BYTES, 600);
        assert_eq!(SEGMENT_BYTES, 300);
        assert_eq!(IMAGE_BYTES, 960_000);
    }
}
