/// Renders bytes as a contiguous lowercase hex string.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Formats a byte buffer as fixed-width hex dump rows.
///
/// # Arguments
///
/// * `data` - The buffer to dump.
///
/// # Returns
///
/// One string per row of 16 bytes (the last row may be shorter), each
/// prefixed with its zero-padded hexadecimal byte offset.
pub fn hex_dump_rows(data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex_vals = chunk
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{:08x}: {}", row * 16, hex_vals)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[0x00, 0xff, 0x1a]), "00ff1a");
        assert_eq!(hex_string(&[]), "");
    }

    #[test]
    fn test_hex_dump_rows_format() {
        let data: Vec<u8> = (0..18).collect();
        let rows = hex_dump_rows(&data);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            "00000000: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f"
        );
        assert_eq!(rows[1], "00000010: 10 11");
    }

    #[test]
    fn test_hex_dump_covers_every_byte_once() {
        for len in [0usize, 1, 15, 16, 17, 64, 100] {
            let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let rows = hex_dump_rows(&data);

            let mut recovered = Vec::new();
            for (i, row) in rows.iter().enumerate() {
                let (offset, hex_vals) = row.split_once(": ").unwrap();
                assert_eq!(usize::from_str_radix(offset, 16).unwrap(), i * 16);
                for byte in hex_vals.split(' ') {
                    recovered.push(u8::from_str_radix(byte, 16).unwrap());
                }
            }
            assert_eq!(recovered, data);
        }
    }
}
