//! CRC-16/CCITT used by every link frame
//!
//! Polynomial 0x1021, initial value 0xFFFF, no reflection, no final XOR.
//! The lookup table is built at compile time.

/// CRC generator polynomial
pub const POLYNOMIAL: u16 = 0x1021;

/// Initial CRC register value
pub const INITIAL: u16 = 0xFFFF;

/// Byte-wise lookup table
pub static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Continue a CRC over `data` starting from `crc`
#[inline]
pub fn crc16_update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        crc = (crc << 8) ^ TABLE[usize::from(((crc >> 8) as u8) ^ byte)];
    }
    crc
}

/// CRC of `data` from the initial value
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    crc16_update(INITIAL, data)
}

/// Running CRC for data that arrives a byte at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Crc16 {
    value: u16,
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc16 {
    /// Start a CRC from the initial value
    pub const fn new() -> Self {
        Self { value: INITIAL }
    }

    /// Start a CRC from an earlier result (chained CRC)
    pub const fn seeded(seed: u16) -> Self {
        Self { value: seed }
    }

    /// Feed one byte
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.value = (self.value << 8) ^ TABLE[usize::from(((self.value >> 8) as u8) ^ byte)];
    }

    /// Feed a slice
    pub fn extend(&mut self, data: &[u8]) {
        self.value = crc16_update(self.value, data);
    }

    /// Current CRC value
    pub const fn value(&self) -> u16 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_check_value() {
        // CRC-16/CCITT-FALSE check value
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_is_initial() {
        assert_eq!(crc16(&[]), INITIAL);
    }

    #[test]
    fn test_table_spot_values() {
        assert_eq!(TABLE[0], 0x0000);
        assert_eq!(TABLE[1], 0x1021);
        assert_eq!(TABLE[0xFF], 0x1EF0);
    }

    #[test]
    fn test_chained_equals_concatenated() {
        let head = [0xAA, 0x55, 0x03, 0x00, 0x10, 0xFF, 0xEF];
        let body = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let seed = crc16(&head);

        let mut whole = [0u8; 15];
        whole[..7].copy_from_slice(&head);
        whole[7..].copy_from_slice(&body);

        assert_eq!(crc16_update(seed, &body), crc16(&whole));
    }

    #[test]
    fn test_running_matches_slice() {
        let data = b"spinring";
        let mut running = Crc16::new();
        for &b in data {
            running.push(b);
        }
        assert_eq!(running.value(), crc16(data));
    }

    proptest! {
        #[test]
        fn single_bit_flip_changes_crc(
            data in proptest::collection::vec(any::<u8>(), 1..64),
            pos in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut flipped = data.clone();
            let i = pos.index(flipped.len());
            flipped[i] ^= 1 << bit;
            prop_assert_ne!(crc16(&data), crc16(&flipped));
        }
    }
}
