//! Builders for synthetic DVI containers and PK fonts used across the
//! integration tests.

#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};

/// Standard unit scalars (TeX's num/den and 1000 magnification).
pub const NUMERATOR: u32 = 25400000;
pub const DENOMINATOR: u32 = 473628672;
pub const MAGNIFICATION: u32 = 1000;

/// Incrementally writes a DVI container, exposing offsets so that tests can
/// lay pages out in arbitrary physical order and patch their links.
pub struct DviBuilder {
    pub buf: Vec<u8>,
}

impl DviBuilder {
    pub fn new(comment: &str) -> Self {
        let mut buf = vec![247, 2];
        buf.write_u32::<BigEndian>(NUMERATOR).unwrap();
        buf.write_u32::<BigEndian>(DENOMINATOR).unwrap();
        buf.write_u32::<BigEndian>(MAGNIFICATION).unwrap();
        buf.push(comment.len() as u8);
        buf.extend_from_slice(comment.as_bytes());
        Self { buf }
    }

    pub fn offset(&self) -> u32 {
        self.buf.len() as u32
    }

    pub fn op(&mut self, code: u8) {
        self.buf.push(code);
    }

    pub fn bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.write_u16::<BigEndian>(v).unwrap();
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.write_u32::<BigEndian>(v).unwrap();
    }

    pub fn i32(&mut self, v: i32) {
        self.buf.write_i32::<BigEndian>(v).unwrap();
    }

    /// Write a `bop`; returns its offset for link patching.
    pub fn begin_page(&mut self, count0: i32, previous: i32) -> u32 {
        let at = self.offset();
        self.op(139);
        self.i32(count0);
        for _ in 0..9 {
            self.i32(0);
        }
        self.i32(previous);
        at
    }

    /// Position of a `bop`'s previous-page link (opcode + ten counts).
    pub fn link_position(bop_offset: u32) -> usize {
        bop_offset as usize + 41
    }

    pub fn patch_i32(&mut self, at: usize, v: i32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_be_bytes());
    }

    pub fn end_page(&mut self) {
        self.op(140);
    }

    /// Single-byte set_char for codes 0..=127.
    pub fn set_char(&mut self, c: u8) {
        assert!(c < 128);
        self.op(c);
    }

    pub fn set_rule(&mut self, height: i32, width: i32) {
        self.op(132);
        self.i32(height);
        self.i32(width);
    }

    pub fn put_rule(&mut self, height: i32, width: i32) {
        self.op(137);
        self.i32(height);
        self.i32(width);
    }

    pub fn special(&mut self, payload: &[u8]) {
        self.op(239);
        self.op(payload.len() as u8);
        self.bytes(payload);
    }

    pub fn font_def(&mut self, id: u8, checksum: u32, scale: u32, design: u32, name: &str) {
        self.op(243);
        self.op(id);
        self.u32(checksum);
        self.u32(scale);
        self.u32(design);
        self.op(0);
        self.op(name.len() as u8);
        self.bytes(name.as_bytes());
    }

    /// Write the `post` scalars; font definitions may follow before
    /// `finish`. Returns the post offset.
    pub fn post(&mut self, last_page: i32, page_count: u16) -> u32 {
        let at = self.offset();
        self.op(248);
        self.i32(last_page);
        self.u32(NUMERATOR);
        self.u32(DENOMINATOR);
        self.u32(MAGNIFICATION);
        self.i32(43725786);
        self.i32(30785863);
        self.u16(4);
        self.u16(page_count);
        at
    }

    /// Write `post_post` and the trailer, padding to a four-byte multiple.
    pub fn finish(mut self, post_at: u32) -> Vec<u8> {
        self.op(249);
        self.u32(post_at);
        self.op(2);
        for _ in 0..4 {
            self.op(223);
        }
        while self.buf.len() % 4 != 0 {
            self.op(223);
        }
        self.buf
    }
}

/// Pack a nybble sequence into bytes, high half first, zero-padding the
/// final byte.
pub fn nybble_bytes(nybbles: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in nybbles.chunks(2) {
        let hi = chunk[0] << 4;
        let lo = chunk.get(1).copied().unwrap_or(0);
        out.push(hi | lo);
    }
    out
}

/// Build a short-form character packet around a raster blob.
#[allow(clippy::too_many_arguments)]
pub fn pk_char_short(
    dyn_f: u8,
    black_first: bool,
    char_code: u8,
    tfm_width: u32,
    dm: u8,
    width: u8,
    height: u8,
    hoff: i8,
    voff: i8,
    blob: &[u8],
) -> Vec<u8> {
    let pl = 8 + blob.len() as u32;
    assert!(pl < 1024, "short form holds 10-bit packet lengths");
    let mut flag = (dyn_f << 4) | ((pl >> 8) as u8);
    if black_first {
        flag |= 8;
    }
    let mut packet = vec![flag, (pl & 0xFF) as u8, char_code];
    packet.extend_from_slice(&tfm_width.to_be_bytes()[1..]);
    packet.push(dm);
    packet.push(width);
    packet.push(height);
    packet.push(hoff as u8);
    packet.push(voff as u8);
    packet.extend_from_slice(blob);
    packet
}

/// Wrap character packets into a complete PK container.
pub fn pk_file_with(checksum: u32, packets: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = vec![247, 89, 0];
    buf.write_u32::<BigEndian>(10 << 20).unwrap();
    buf.write_u32::<BigEndian>(checksum).unwrap();
    buf.write_u32::<BigEndian>(394942).unwrap();
    buf.write_u32::<BigEndian>(394942).unwrap();
    for packet in packets {
        buf.extend_from_slice(packet);
    }
    buf.push(245);
    buf
}

pub fn pk_file(packets: &[Vec<u8>]) -> Vec<u8> {
    pk_file_with(0x89ABCDEF, packets)
}

/// A 4x4 uncompressed test glyph (all pixels black) with a 1.0 fix-word
/// width, suitable for machine tests.
pub fn solid_glyph_packet(char_code: u8) -> Vec<u8> {
    pk_char_short(
        14,
        false,
        char_code,
        1 << 20,
        4,
        4,
        4,
        0,
        0,
        &[0xFF, 0xFF],
    )
}
