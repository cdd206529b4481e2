/// Substitute for characters that have no Latin-1 code point.
pub const REPLACEMENT: u8 = b'?';

/// Append `text` as ISO-8859-1 bytes.
pub fn encode_into(text: &str, out: &mut Vec<u8>) {
    out.extend(text.chars().map(|c| {
        let code = c as u32;
        if code <= 0xff {
            code as u8
        } else {
            REPLACEMENT
        }
    }));
}

/// Number of bytes `text` occupies once encoded.
pub fn encoded_len(text: &str) -> usize {
    text.chars().count()
}

/// Every byte maps to the code point of the same value.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
