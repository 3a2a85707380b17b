//! Encoder -> bit packer -> inflater round trips.

use inflatelib_core::error::InflateError;
use inflatelib_deflate::tables::{decode_distance, decode_length};
use inflatelib_deflate::{
    BlockItem, InflateMode, InflateStatus, Inflater, encode_block_text, inflate, inflate64,
    pack_block_text, parse_symbol_stream,
};

/// Encode a symbol stream and pack it to bytes.
fn compress(mode: InflateMode, stream: &str, force_static: bool) -> Vec<u8> {
    let items = parse_symbol_stream(mode, stream).unwrap();
    let text = encode_block_text(mode, &items, force_static).unwrap();
    pack_block_text(&text).unwrap()
}

/// The byte sequence a symbol stream stands for.
fn expected_output(mode: InflateMode, stream: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for item in parse_symbol_stream(mode, stream).unwrap() {
        match item {
            BlockItem::Lit(byte) => out.push(byte),
            BlockItem::Eob => break,
            BlockItem::Ref {
                len_symbol,
                len_extra,
                dist_symbol,
                dist_extra,
            } => {
                let length = decode_length(mode, len_symbol, len_extra) as usize;
                let distance = decode_distance(dist_symbol, dist_extra) as usize;
                for _ in 0..length {
                    let byte = out[out.len() - distance];
                    out.push(byte);
                }
            }
        }
    }
    out
}

fn roundtrip(mode: InflateMode, stream: &str) {
    let bytes = compress(mode, stream, false);
    let output = match mode {
        InflateMode::Deflate => inflate(&bytes).unwrap(),
        InflateMode::Deflate64 => inflate64(&bytes).unwrap(),
    };
    assert_eq!(output, expected_output(mode, stream), "stream: {}", stream);
}

#[test]
fn test_static_abc_is_bit_exact() {
    let bytes = compress(InflateMode::Deflate, "\"ABC\"", true);
    assert_eq!(bytes, vec![0x73, 0x74, 0x72, 0x06, 0x00]);
}

#[test]
fn test_static_roundtrip_with_matches() {
    let bytes = compress(InflateMode::Deflate, "\"abcabc\" (6, 3) (3, 1)", true);
    assert_eq!(
        inflate(&bytes).unwrap(),
        expected_output(InflateMode::Deflate, "\"abcabc\" (6, 3) (3, 1)")
    );
}

#[test]
fn test_dynamic_text_roundtrip() {
    roundtrip(
        InflateMode::Deflate,
        "\"the quick brown fox jumps over the lazy dog \" (9, 44) (4, 4)",
    );
}

#[test]
fn test_empty_huffman_block() {
    // Just the end-of-block symbol right after the header.
    let bytes = compress(InflateMode::Deflate, "", false);
    assert_eq!(inflate(&bytes).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_backref_distance_one_fill() {
    // 'A' then length 3 at distance 1 -> "AAAA".
    let bytes = compress(InflateMode::Deflate, "'A' (3, 1)", false);
    assert_eq!(inflate(&bytes).unwrap(), b"AAAA");
}

#[test]
fn test_overlapping_copy() {
    roundtrip(InflateMode::Deflate, "\"AB\" (6, 2)");
    roundtrip(InflateMode::Deflate, "\"xy\" (255, 2)");
}

#[test]
fn test_single_distance_code_alphabet() {
    // Every match uses distance 1: the distance alphabet is a single
    // 1-bit code, which table construction must accept.
    roundtrip(InflateMode::Deflate, "'q' (3, 1) 'r' (5, 1)");
}

#[test]
fn test_raw_symbol_form() {
    // 265 + extra 1 = length 12; distance symbol 4 + extra 1 = distance 6.
    let stream = "\"abcdef\" 265 1 4 1";
    roundtrip(InflateMode::Deflate, stream);
    assert_eq!(
        expected_output(InflateMode::Deflate, stream).len(),
        6 + 12
    );
}

#[test]
fn test_deflate64_long_length_extremes() {
    // Length symbol 285 with zero extra bits is a 3-byte match.
    let bytes = compress(InflateMode::Deflate64, "'A' 285 0 0 0", false);
    assert_eq!(inflate64(&bytes).unwrap(), b"AAAA");

    // With all 16 extra bits set it is a 65 538-byte match.
    let bytes = compress(InflateMode::Deflate64, "'A' 285 65535 0 0", false);
    let output = inflate64(&bytes).unwrap();
    assert_eq!(output.len(), 1 + 65_538);
    assert!(output.iter().all(|&byte| byte == b'A'));
}

#[test]
fn test_deflate64_pair_syntax_long_match() {
    let bytes = compress(InflateMode::Deflate64, "\"0123456789\" (65538, 10)", false);
    let output = inflate64(&bytes).unwrap();
    assert_eq!(output.len(), 10 + 65_538);
    assert_eq!(&output[..20], b"01234567890123456789");
    assert_eq!(output[10 + 65_537], b'7');
}

#[test]
fn test_match_at_exact_window_capacity() {
    // A non-final stored block writes 32 KiB of history, then a dynamic
    // block reaches back exactly the window capacity.
    let mut history = Vec::new();
    for i in 0..32 * 1024 {
        history.push((i % 251) as u8);
    }
    let mut stream = Vec::new();
    stream.push(0x00); // BFINAL=0, BTYPE=00
    stream.extend_from_slice(&(history.len() as u16).to_le_bytes());
    stream.extend_from_slice(&(!(history.len() as u16)).to_le_bytes());
    stream.extend_from_slice(&history);
    stream.extend_from_slice(&compress(InflateMode::Deflate, "(4, 32768)", false));

    let output = inflate(&stream).unwrap();
    assert_eq!(output.len(), history.len() + 4);
    assert_eq!(&output[history.len()..], &history[..4]);
}

#[test]
fn test_distance_past_history_rejected() {
    // A match with no history behind it encodes fine but cannot decode.
    let bytes = compress(InflateMode::Deflate, "(3, 1)", false);
    assert!(matches!(
        inflate(&bytes).unwrap_err(),
        InflateError::InvalidDistance {
            distance: 1,
            available: 0,
        }
    ));

    let bytes = compress(InflateMode::Deflate, "'A' (3, 7)", false);
    assert!(matches!(
        inflate(&bytes).unwrap_err(),
        InflateError::InvalidDistance { distance: 7, .. }
    ));
}

#[test]
fn test_distance_codes_30_31_invalid_in_deflate_mode() {
    // 40 KiB of stored history, then a Deflate64 block whose match uses
    // distance symbol 30 (base 32 769). Decoding the same bytes as plain
    // DEFLATE must fail: that symbol is outside the alphabet.
    let history: Vec<u8> = (0..40 * 1024u32).map(|i| (i % 239) as u8).collect();
    let mut stream = Vec::new();
    stream.push(0x00); // BFINAL=0, BTYPE=00
    stream.extend_from_slice(&(history.len() as u16).to_le_bytes());
    stream.extend_from_slice(&(!(history.len() as u16)).to_le_bytes());
    stream.extend_from_slice(&history);
    stream.extend_from_slice(&compress(InflateMode::Deflate64, "(3, 32769)", false));

    let output = inflate64(&stream).unwrap();
    assert_eq!(output.len(), history.len() + 3);
    let start = history.len() - 32_769;
    assert_eq!(&output[history.len()..], &history[start..start + 3]);

    assert!(inflate(&stream).is_err());
}

#[test]
fn test_chunked_decode_of_encoded_block() {
    let stream = "\"she sells sea shells by the sea shore \" (10, 29) (5, 14) 'x'";
    let bytes = compress(InflateMode::Deflate, stream, false);
    let reference = expected_output(InflateMode::Deflate, stream);

    let mut inflater = Inflater::new(InflateMode::Deflate);
    let mut out = [0u8; 3];
    let mut collected = Vec::new();
    for &byte in &bytes {
        inflater.feed(&[byte]);
        loop {
            let progress = inflater.inflate(&mut out).unwrap();
            collected.extend_from_slice(&out[..progress.produced]);
            if progress.status != InflateStatus::NeedsOutput {
                break;
            }
        }
    }
    assert_eq!(collected, reference);
    assert!(inflater.is_finished());
}

#[test]
fn test_block_text_mentions_rle_boundaries() {
    // A block whose only literal is far into the alphabet forces a
    // maximum-size 18-run (138 zeros) in the header.
    let items = parse_symbol_stream(InflateMode::Deflate, "'\\0' 255").unwrap();
    let text = encode_block_text(InflateMode::Deflate, &items, false).unwrap();
    assert!(text.contains("repeat zero 138 times"));

    let bytes = pack_block_text(&text).unwrap();
    assert_eq!(inflate(&bytes).unwrap(), vec![0x00, 0xFF]);
}
