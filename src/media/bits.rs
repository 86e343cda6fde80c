//! Bit and byte readers for the hand-parsed stream headers.

/// MSB-first reader over a byte slice. Every read returns `None` once the
/// slice runs out.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Read up to 32 bits as an unsigned value.
    pub fn read_bits(&mut self, count: usize) -> Option<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Some(value)
    }

    pub fn read_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.bit_pos / 8)?;
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Some(bit)
    }

    pub fn read_flag(&mut self) -> Option<bool> {
        self.read_bit().map(|b| b == 1)
    }

    pub fn skip(&mut self, count: usize) -> Option<()> {
        if self.bit_pos + count > self.data.len() * 8 {
            return None;
        }
        self.bit_pos += count;
        Some(())
    }

    /// Exp-Golomb unsigned.
    pub fn read_ue(&mut self) -> Option<u32> {
        let mut zeros = 0usize;
        while self.read_bit()? == 0 {
            zeros += 1;
            if zeros > 31 {
                return None;
            }
        }
        let value = if zeros > 0 { self.read_bits(zeros)? } else { 0 };
        Some((1u32 << zeros) - 1 + value)
    }

    /// Exp-Golomb signed.
    pub fn read_se(&mut self) -> Option<i32> {
        let code = self.read_ue()? as i64;
        let magnitude = (code + 1) / 2;
        let signed = if code % 2 == 0 { -magnitude } else { magnitude };
        Some(signed as i32)
    }
}

/// Drop the `03` in every `00 00 03` run of an H.264 NAL unit.
pub fn strip_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut cleaned = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if i + 2 < data.len() && data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 3 {
            cleaned.extend_from_slice(&[0, 0]);
            i += 3;
            continue;
        }
        cleaned.push(data[i]);
        i += 1;
    }
    cleaned
}

/// Offset of the first `00 00 01 <code>` start code.
pub fn find_start_code(data: &[u8], code: u8) -> Option<usize> {
    data.windows(4).position(|w| w == [0, 0, 1, code])
}

/// Offset of the first `00 00 01` prefix, whatever code follows.
pub fn next_start_code(data: &[u8]) -> Option<usize> {
    data.windows(3).position(|w| w == [0, 0, 1])
}

// ── Little-endian fields (ASF) ───────────────────────────────────────────────

pub fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(data.get(at..at + 2)?.try_into().ok()?))
}

pub fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(data.get(at..at + 4)?.try_into().ok()?))
}

pub fn le_u64(data: &[u8], at: usize) -> Option<u64> {
    Some(u64::from_le_bytes(data.get(at..at + 8)?.try_into().ok()?))
}

pub fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(data.get(at..at + 2)?.try_into().ok()?))
}
