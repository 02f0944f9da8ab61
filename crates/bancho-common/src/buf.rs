// buf.rs — wire-level primitives
//
// Spiritual successor of the teacher's `SizeBuf` plus its `msg_write_*`/
// `msg_read_*` free functions (myq2-common/src/common.rs). Two changes
// from that idiom: reads return `Result` instead of a `-1` sentinel or a
// panic, and the writer grows instead of being preallocated to a fixed
// `maxsize`, since packet bodies here are not bounded by a known UDP MTU.

use crate::error::ProtocolError;

/// A length-prefixed string's presence tag. `0x00` means absent/empty;
/// `0x0b` ("\x0b", the ULEB128 marker osu!'s wire format reuses from .NET
/// `BinaryWriter.Write(string)`) means a varint length followed by UTF-8
/// bytes.
const STRING_PRESENT: u8 = 0x0b;
const STRING_ABSENT: u8 = 0x00;

const MAX_STRING_LEN: usize = 1 << 20;

/// A growable little-endian packet writer.
#[derive(Debug, Default, Clone)]
pub struct PacketWriter {
    data: Vec<u8>,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.data.push(v as u8);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.data.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    /// Writes the presence-tagged, ULEB128-length-prefixed string.
    pub fn write_string(&mut self, s: &str) {
        if s.is_empty() {
            self.data.push(STRING_ABSENT);
            return;
        }
        self.data.push(STRING_PRESENT);
        write_uleb128(&mut self.data, s.len() as u64);
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Writes a `u16`-prefixed list, invoking `write_elem` for each item.
    pub fn write_list16<T>(&mut self, items: &[T], mut write_elem: impl FnMut(&mut Self, &T)) {
        self.write_u16(items.len() as u16);
        for item in items {
            write_elem(self, item);
        }
    }

    /// Writes an `i32`-prefixed list, invoking `write_elem` for each item.
    pub fn write_list32<T>(&mut self, items: &[T], mut write_elem: impl FnMut(&mut Self, &T)) {
        self.write_i32(items.len() as i32);
        for item in items {
            write_elem(self, item);
        }
    }
}

fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// A cursor over an immutable byte slice with `Result`-returning reads.
#[derive(Debug, Clone, Copy)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::UnexpectedEof {
                wanted: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        self.take(n)
    }

    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64, ProtocolError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_f32(&mut self) -> Result<f32, ProtocolError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_uleb128(&mut self) -> Result<u64, ProtocolError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return Err(ProtocolError::VarintOverflow);
            }
            let byte = self.read_u8()?;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(result)
    }

    /// Reads a presence-tagged, ULEB128-length-prefixed string.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let tag = self.read_u8()?;
        match tag {
            STRING_ABSENT => Ok(String::new()),
            STRING_PRESENT => {
                let len = self.read_uleb128()? as usize;
                if len > MAX_STRING_LEN {
                    return Err(ProtocolError::StringTooLong(len, MAX_STRING_LEN));
                }
                let bytes = self.take(len)?;
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            other => Err(ProtocolError::BadStringTag(other)),
        }
    }

    /// Reads a `u16`-prefixed list, invoking `read_elem` for each item.
    pub fn read_list16<T>(
        &mut self,
        mut read_elem: impl FnMut(&mut Self) -> Result<T, ProtocolError>,
    ) -> Result<Vec<T>, ProtocolError> {
        let count = self.read_u16()? as usize;
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(read_elem(self)?);
        }
        Ok(out)
    }

    /// Reads an `i32`-prefixed list, invoking `read_elem` for each item.
    pub fn read_list32<T>(
        &mut self,
        mut read_elem: impl FnMut(&mut Self) -> Result<T, ProtocolError>,
    ) -> Result<Vec<T>, ProtocolError> {
        let count = self.read_i32()?.max(0) as usize;
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(read_elem(self)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_fixed_width_ints() {
        let mut w = PacketWriter::new();
        w.write_u8(0xab);
        w.write_i16(-1234);
        w.write_u32(0xdead_beef);
        w.write_i64(-1);
        w.write_f32(3.5);

        let bytes = w.into_inner();
        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0xab);
        assert_eq!(r.read_i16().unwrap(), -1234);
        assert_eq!(r.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(r.read_i64().unwrap(), -1);
        assert_eq!(r.read_f32().unwrap(), 3.5);
        assert!(r.is_empty());
    }

    #[test]
    fn round_trips_strings() {
        let mut w = PacketWriter::new();
        w.write_string("");
        w.write_string("peppy");
        w.write_string(&"x".repeat(300));

        let bytes = w.into_inner();
        let mut r = PacketReader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), "");
        assert_eq!(r.read_string().unwrap(), "peppy");
        assert_eq!(r.read_string().unwrap(), "x".repeat(300));
    }

    #[test]
    fn read_past_end_errors_instead_of_panicking() {
        let bytes = [0u8; 1];
        let mut r = PacketReader::new(&bytes);
        assert!(r.read_u32().is_err());
    }

    #[test]
    fn list_round_trip() {
        let mut w = PacketWriter::new();
        w.write_list16(&[1i32, 2, 3], |w, v| w.write_i32(*v));
        let bytes = w.into_inner();
        let mut r = PacketReader::new(&bytes);
        let values = r.read_list16(|r| r.read_i32()).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
