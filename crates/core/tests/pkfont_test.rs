//! Packed font decoding: preamble forms, run-length reconstruction, row
//! repeats, and malformed-packet rejection.

mod common;

use byteorder::{BigEndian, WriteBytesExt};
use common::{nybble_bytes, pk_char_short, pk_file};
use fuchs_core::error::DviError;
use fuchs_core::PkFont;
use std::io::Cursor;

fn parse(data: Vec<u8>) -> fuchs_core::Result<PkFont> {
    PkFont::parse(Cursor::new(data))
}

/// Build an extended-short-form packet (two-byte coordinate fields).
#[allow(clippy::too_many_arguments)]
fn pk_char_extended(
    dyn_f: u8,
    black_first: bool,
    char_code: u8,
    tfm_width: u32,
    dm: u16,
    width: u16,
    height: u16,
    hoff: i16,
    voff: i16,
    blob: &[u8],
) -> Vec<u8> {
    let pl = 13 + blob.len() as u32;
    let mut flag = (dyn_f << 4) | 4 | ((pl >> 16) as u8 & 3);
    if black_first {
        flag |= 8;
    }
    let mut packet = vec![flag];
    packet.write_u16::<BigEndian>(pl as u16).unwrap();
    packet.push(char_code);
    packet.extend_from_slice(&tfm_width.to_be_bytes()[1..]);
    packet.write_u16::<BigEndian>(dm).unwrap();
    packet.write_u16::<BigEndian>(width).unwrap();
    packet.write_u16::<BigEndian>(height).unwrap();
    packet.write_i16::<BigEndian>(hoff).unwrap();
    packet.write_i16::<BigEndian>(voff).unwrap();
    packet.extend_from_slice(blob);
    packet
}

/// Build a long-form packet (four-byte fields).
#[allow(clippy::too_many_arguments)]
fn pk_char_long(
    dyn_f: u8,
    black_first: bool,
    char_code: u32,
    tfm_width: u32,
    dx: i32,
    dy: i32,
    width: u32,
    height: u32,
    hoff: i32,
    voff: i32,
    blob: &[u8],
) -> Vec<u8> {
    let mut flag = (dyn_f << 4) | 7;
    if black_first {
        flag |= 8;
    }
    let mut packet = vec![flag];
    packet.write_u32::<BigEndian>(28 + blob.len() as u32).unwrap();
    packet.write_u32::<BigEndian>(char_code).unwrap();
    packet.write_u32::<BigEndian>(tfm_width).unwrap();
    packet.write_i32::<BigEndian>(dx).unwrap();
    packet.write_i32::<BigEndian>(dy).unwrap();
    packet.write_u32::<BigEndian>(width).unwrap();
    packet.write_u32::<BigEndian>(height).unwrap();
    packet.write_i32::<BigEndian>(hoff).unwrap();
    packet.write_i32::<BigEndian>(voff).unwrap();
    packet.extend_from_slice(blob);
    packet
}

#[test]
fn preamble_scalars_are_read() {
    let font = parse(pk_file(&[])).unwrap();
    assert_eq!(font.comment, "");
    assert_eq!(font.design_size, 10 << 20);
    assert_eq!(font.checksum, 0x89ABCDEF);
    assert_eq!(font.hppp, 394942);
    assert_eq!(font.vppp, 394942);
    assert!(font.is_empty());
}

#[test]
fn single_black_run_fills_the_raster() {
    // dyn_f = 10: a run of 8 is the single nybble 8.
    let packet = pk_char_short(10, true, b'o', 1 << 19, 4, 4, 2, 0, 0, &nybble_bytes(&[8]));
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'o')).unwrap();
    assert_eq!(glyph.pixel_width, 4);
    assert_eq!(glyph.pixel_height, 2);
    assert_eq!(glyph.tfm_width, 1 << 19);
    assert_eq!(glyph.dx, 4 << 16);
    assert_eq!(glyph.raster(), &[1u8; 8]);
}

#[test]
fn runs_alternate_color_within_a_row() {
    // black 1, white 2, black 1.
    let packet = pk_char_short(10, true, b'i', 1 << 20, 4, 4, 1, 0, 0, &nybble_bytes(&[1, 2, 1]));
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'i')).unwrap();
    assert_eq!(glyph.raster(), &[1, 0, 0, 1]);
}

#[test]
fn white_first_inverts_the_initial_color() {
    let packet = pk_char_short(10, false, b'j', 1 << 20, 4, 4, 1, 0, 0, &nybble_bytes(&[1, 2, 1]));
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'j')).unwrap();
    assert_eq!(glyph.raster(), &[0, 1, 1, 0]);
}

#[test]
fn a_run_crosses_row_boundaries_keeping_its_color() {
    // black 6 then white 2 over a 4x2 raster.
    let packet = pk_char_short(10, true, b'm', 1 << 20, 4, 4, 2, 0, 0, &nybble_bytes(&[6, 2]));
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'm')).unwrap();
    assert_eq!(glyph.raster(), &[1, 1, 1, 1, 1, 1, 0, 0]);
}

#[test]
fn explicit_row_repeat_copies_the_finished_row() {
    // Repeat count 2 scheduled inside row 0; rows 1 and 2 copy row 0 and
    // row 3 decodes independently.
    let packet = pk_char_short(
        10,
        true,
        b'E',
        1 << 20,
        4,
        4,
        4,
        0,
        0,
        &nybble_bytes(&[14, 2, 2, 2, 4]),
    );
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'E')).unwrap();
    let rows: Vec<&[u8]> = glyph.rows().collect();
    assert_eq!(rows[0], &[1, 1, 0, 0]);
    assert_eq!(rows[1], rows[0]);
    assert_eq!(rows[2], rows[0]);
    assert_eq!(rows[3], &[1, 1, 1, 1]);
}

#[test]
fn nybble_15_repeats_once() {
    let packet = pk_char_short(10, true, b'=', 1 << 20, 2, 2, 2, 0, 0, &nybble_bytes(&[15, 2]));
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'=')).unwrap();
    assert_eq!(glyph.raster(), &[1, 1, 1, 1]);
}

#[test]
fn big_escaped_runs_cover_tall_glyphs() {
    // [0, 2, 3] decodes to 78 under dyn_f 10: a 6x13 all-black raster.
    let packet = pk_char_short(10, true, b'#', 1 << 20, 6, 6, 13, 0, 0, &nybble_bytes(&[0, 2, 3]));
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'#')).unwrap();
    assert_eq!(glyph.raster().len(), 78);
    assert!(glyph.raster().iter().all(|&p| p == 1));
}

#[test]
fn dyn_f_14_is_an_uncompressed_bit_stream() {
    let packet = pk_char_short(14, false, b'R', 1 << 20, 4, 4, 4, 0, 0, &[0xA5, 0xF0]);
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'R')).unwrap();
    let rows: Vec<&[u8]> = glyph.rows().collect();
    assert_eq!(rows[0], &[1, 0, 1, 0]);
    assert_eq!(rows[1], &[0, 1, 0, 1]);
    assert_eq!(rows[2], &[1, 1, 1, 1]);
    assert_eq!(rows[3], &[0, 0, 0, 0]);
    assert!(glyph.pixel(0, 0));
    assert!(!glyph.pixel(1, 0));
    // Out-of-range pixels read as white.
    assert!(!glyph.pixel(9, 9));
}

#[test]
fn extended_short_form_round_trips_metrics() {
    let packet = pk_char_extended(
        10,
        true,
        b'W',
        1 << 20,
        300,
        4,
        2,
        -2,
        17,
        &nybble_bytes(&[8]),
    );
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(u32::from(b'W')).unwrap();
    assert_eq!(glyph.dx, 300 << 16);
    assert_eq!(glyph.horizontal_offset, -2);
    assert_eq!(glyph.vertical_offset, 17);
    assert_eq!(glyph.raster(), &[1u8; 8]);
}

#[test]
fn long_form_round_trips_metrics() {
    let packet = pk_char_long(
        14,
        false,
        0x1F600,
        1 << 21,
        5 << 16,
        -(1 << 16),
        4,
        1,
        -7,
        -9,
        &[0xA0],
    );
    let font = parse(pk_file(&[packet])).unwrap();

    let glyph = font.glyph(0x1F600).unwrap();
    assert_eq!(glyph.tfm_width, 1 << 21);
    assert_eq!(glyph.dx, 5 << 16);
    assert_eq!(glyph.dy, -(1 << 16));
    assert_eq!(glyph.horizontal_offset, -7);
    assert_eq!(glyph.vertical_offset, -9);
    assert_eq!(glyph.raster(), &[1, 0, 1, 0]);
}

#[test]
fn duplicate_character_codes_keep_the_first_definition() {
    let first = pk_char_short(10, true, b'x', 1 << 20, 4, 4, 1, 0, 0, &nybble_bytes(&[4]));
    let second = pk_char_short(10, false, b'x', 1 << 20, 4, 4, 1, 0, 0, &nybble_bytes(&[4]));
    let font = parse(pk_file(&[first, second])).unwrap();

    assert_eq!(font.glyph_count(), 1);
    assert_eq!(font.glyph(u32::from(b'x')).unwrap().raster(), &[1, 1, 1, 1]);
}

#[test]
fn specials_between_packets_are_skipped() {
    let packet = pk_char_short(10, true, b'y', 1 << 20, 2, 2, 1, 0, 0, &nybble_bytes(&[2]));
    let mut extras = vec![246u8]; // nop
    extras.push(240); // xxx1
    extras.push(3);
    extras.extend_from_slice(b"abc");
    extras.push(244); // yyy
    extras.extend_from_slice(&[0, 0, 0, 42]);
    extras.extend_from_slice(&packet);

    // Splice the extras in as a single pseudo-packet.
    let font = parse(pk_file(&[extras])).unwrap();
    assert_eq!(font.glyph_count(), 1);
}

#[test]
fn packet_length_below_preamble_tail_is_malformed() {
    // Short form with pl = 5 < 8.
    let mut packet = vec![0xA0u8, 5, b'z'];
    packet.extend_from_slice(&[0, 0, 0]); // tfm
    packet.extend_from_slice(&[1, 1, 1, 0, 0]); // dm w h hoff voff
    assert!(matches!(
        parse(pk_file(&[packet])),
        Err(DviError::MalformedPackedGlyph(_))
    ));
}

#[test]
fn trailing_bytes_after_decode_are_malformed() {
    let mut blob = nybble_bytes(&[8]);
    blob.push(0);
    let packet = pk_char_short(10, true, b'o', 1 << 20, 4, 4, 2, 0, 0, &blob);
    assert!(matches!(
        parse(pk_file(&[packet])),
        Err(DviError::MalformedPackedGlyph(_))
    ));
}

#[test]
fn runs_overflowing_the_raster_are_malformed() {
    // A run of 8 cannot fit a 4x1 raster.
    let packet = pk_char_short(10, true, b'o', 1 << 20, 4, 4, 1, 0, 0, &nybble_bytes(&[8]));
    assert!(matches!(
        parse(pk_file(&[packet])),
        Err(DviError::MalformedPackedGlyph(_))
    ));
}

#[test]
fn truncated_packet_is_reported() {
    let packet = pk_char_short(10, true, b'o', 1 << 20, 4, 4, 2, 0, 0, &nybble_bytes(&[8]));
    let mut data = pk_file(&[packet]);
    // Drop the post marker and the raster byte.
    data.truncate(data.len() - 2);
    assert!(matches!(parse(data), Err(DviError::TruncatedStream)));
}

#[test]
fn wrong_magic_and_id_are_rejected() {
    assert!(matches!(
        parse(vec![0, 0, 0, 0]),
        Err(DviError::BadMagic(0))
    ));
    let mut data = pk_file(&[]);
    data[1] = 88;
    assert!(matches!(parse(data), Err(DviError::UnknownFormat(88))));
}
