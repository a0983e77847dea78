use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Allocation bitmap of a network's address pool.
///
/// Bit `n` stands for the address at offset `n` from the network address. Bits are
/// stored most significant first within each byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    data: Vec<u8>,
}

impl BitArray {
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        Ok(Self {
            data: STANDARD.decode(encoded)?,
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// Number of addresses the bitmap covers.
    pub fn len(&self) -> u64 {
        self.data.len() as u64 * 8
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[cfg(test)]
    fn is_set(&self, pos: u64) -> bool {
        self.locate(pos)
            .is_some_and(|(byte, mask)| self.data[byte] & mask != 0)
    }

    /// Clears bit `pos`. Returns whether the bitmap changed.
    pub fn reset(&mut self, pos: u64) -> bool {
        match self.locate(pos) {
            Some((byte, mask)) if self.data[byte] & mask != 0 => {
                self.data[byte] &= !mask;
                true
            }
            _ => false,
        }
    }

    fn locate(&self, pos: u64) -> Option<(usize, u8)> {
        if pos >= self.len() {
            return None;
        }
        Some(((pos / 8) as usize, 0x80 >> (pos % 8)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_order_is_msb_first() {
        // 0b1000_0001, 0b0100_0000
        let bits = BitArray::from_base64(&STANDARD.encode([0x81, 0x40])).unwrap();
        assert_eq!(bits.len(), 16);
        assert!(bits.is_set(0));
        assert!(bits.is_set(7));
        assert!(bits.is_set(9));
        assert!(!bits.is_set(1));
        assert!(!bits.is_set(8));
    }

    #[test]
    fn test_reset() {
        let mut bits = BitArray::from_base64(&STANDARD.encode([0xff, 0xff])).unwrap();
        assert!(bits.reset(5));
        assert!(!bits.is_set(5));
        assert!(!bits.reset(5), "clearing twice must not report a change");
        assert_eq!(bits.to_base64(), STANDARD.encode([0xfb, 0xff]));
    }

    #[test]
    fn test_out_of_range() {
        let mut bits = BitArray::from_base64(&STANDARD.encode([0xff])).unwrap();
        assert!(!bits.is_set(8));
        assert!(!bits.reset(8));
        assert!(BitArray::from_base64("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_encoding() {
        assert!(BitArray::from_base64("not base64!").is_err());
    }
}
