/// Field accessors for a raw 16-bit Chip-8 instruction word.
///
/// ```text
///  15   12 11    8 7     4 3     0
/// +-------+-------+-------+-------+
/// | class |   x   |   y   |   n   |
/// +-------+-------+-------+-------+
///         |      nnn (address)    |
///                 |   nn (byte)   |
/// ```
///
/// `class` picks the instruction family. Within `0___`, `8xy_`, `Ex__` and `Fx__` the low nibble
/// or byte picks the operation; everywhere else those bits are operands.
pub trait Opcode {
    /// `(class, x, y, n)`, the shape `Instruction::decode` matches on
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// Register index in bits 8..12
    fn x(&self) -> u8;

    /// Register index in bits 4..8
    fn y(&self) -> u8;

    /// Sprite height for `Dxyn`, otherwise an operation selector
    fn n(&self) -> u8;

    /// Immediate byte
    fn nn(&self) -> u8;

    /// 12-bit address
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        ((self >> 12) as u8, self.x(), self.y(), self.n())
    }

    fn x(&self) -> u8 {
        (self >> 8) as u8 & 0xF
    }

    fn y(&self) -> u8 {
        (self >> 4) as u8 & 0xF
    }

    fn n(&self) -> u8 {
        *self as u8 & 0xF
    }

    fn nn(&self) -> u8 {
        *self as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}

/// Combines the two bytes of an instruction as they sit in memory
pub fn from_bytes(high: u8, low: u8) -> u16 {
    u16::from(high) << 8 | u16::from(low)
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    #[test]
    fn test_nibbles() {
        let op: u16 = 0xABCD;
        assert_eq!(op.nibbles(), (0xA, 0xB, 0xC, 0xD));
    }

    #[test]
    fn test_x() {
        assert_eq!(0xABCDu16.x(), 0xB);
    }

    #[test]
    fn test_y() {
        assert_eq!(0xABCDu16.y(), 0xC);
    }

    #[test]
    fn test_n() {
        assert_eq!(0xABCDu16.n(), 0xD);
    }

    #[test]
    fn test_nn() {
        assert_eq!(0xABCDu16.nn(), 0xCD);
    }

    #[test]
    fn test_nnn() {
        assert_eq!(0xABCDu16.nnn(), 0x0BCD);
    }

    #[test]
    fn test_fields_dont_bleed() {
        let op: u16 = 0xFFFF;
        assert_eq!(op.nibbles(), (0xF, 0xF, 0xF, 0xF));
        assert_eq!(op.nn(), 0xFF);
        assert_eq!(op.nnn(), 0xFFF);
        assert_eq!(0x0100u16.nibbles(), (0x0, 0x1, 0x0, 0x0));
    }

    #[test]
    fn test_from_bytes_is_big_endian() {
        assert_eq!(from_bytes(0xA2, 0xF0), 0xA2F0);
        assert_eq!(from_bytes(0x00, 0xEE), 0x00EE);
    }
}
