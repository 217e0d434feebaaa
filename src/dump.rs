//! Hex dump presentation of transmitted frames.

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Canonical hex dump: offset, two groups of eight bytes, printable ASCII.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x} ", line * BYTES_PER_LINE);
        for i in 0..BYTES_PER_LINE {
            if i % 8 == 0 {
                out.push(' ');
            }
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' }));
        out.push_str("|\n");
    }

    out
}

/// `Packet <n>:` sections for every frame, in transmission order.
pub fn render_frames(frames: &[Vec<u8>]) -> String {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| format!("Packet {i}:\n{}", hex_dump(frame)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump_partial_line() {
        let dump = hex_dump(b"#AL#1\r\n");
        assert_eq!(
            dump,
            "00000000  23 41 4c 23 31 0d 0a                              |#AL#1..|\n"
        );
    }

    #[test]
    fn test_hex_dump_multiple_lines() {
        let data: Vec<u8> = (0u8..20).collect();
        let dump = hex_dump(&data);
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00000000  00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f  |................|"
        );
        assert!(lines[1].starts_with("00000010  10 11 12 13 "));
    }

    #[test]
    fn test_hex_dump_empty() {
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn test_render_frames() {
        let text = render_frames(&[b"AB".to_vec(), b"C".to_vec()]);
        assert!(text.starts_with("Packet 0:\n00000000  41 42"));
        assert!(text.contains("Packet 1:\n00000000  43"));
    }
}
