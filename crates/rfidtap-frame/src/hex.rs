use crate::HexTokenError;

/// Two-digit lowercase hex text of one byte.
#[must_use]
pub fn encode_token(byte: u8) -> String {
    format!("{byte:02x}")
}

pub fn decode_token(token: &str) -> Result<u8, HexTokenError> {
    if token.len() != 2 {
        return Err(HexTokenError::BadWidth {
            token: token.to_owned(),
        });
    }
    if !token.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(HexTokenError::NotHex {
            token: token.to_owned(),
        });
    }

    u8::from_str_radix(token, 16).map_err(|_| HexTokenError::NotHex {
        token: token.to_owned(),
    })
}

#[must_use]
pub fn tokens(chunk: &[u8]) -> Vec<String> {
    chunk.iter().copied().map(encode_token).collect()
}

#[must_use]
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(",")
}

/// Parses one session log line back into raw bytes.
///
/// Whitespace around tokens and a trailing comma are tolerated, so lines written by
/// older loggers that terminated every token with a comma still decode.
pub fn parse_token_line(line: &str) -> Result<Vec<u8>, HexTokenError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let line = line.strip_suffix(',').unwrap_or(line);
    line.split(',').map(|token| decode_token(token.trim())).collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_token, encode_token, join_tokens, parse_token_line, tokens};
    use crate::HexTokenError;

    #[test]
    fn every_byte_survives_token_round_trip() {
        for byte in 0..=u8::MAX {
            let token = encode_token(byte);
            assert_eq!(token.len(), 2);
            assert_eq!(decode_token(&token), Ok(byte));
        }
    }

    #[test]
    fn tokens_are_lowercase_and_zero_padded() {
        assert_eq!(tokens(&[0x02, 0xAB, 0x0f]), ["02", "ab", "0f"]);
        assert_eq!(join_tokens(&tokens(&[0xbb, 0x3a, 0x00])), "bb,3a,00");
    }

    #[test]
    fn decode_rejects_bad_width_and_non_hex() {
        assert!(matches!(
            decode_token("abc"),
            Err(HexTokenError::BadWidth { .. })
        ));
        assert!(matches!(
            decode_token("+f"),
            Err(HexTokenError::NotHex { .. })
        ));
        assert!(matches!(
            decode_token("zz"),
            Err(HexTokenError::NotHex { .. })
        ));
    }

    #[test]
    fn parses_log_lines_with_and_without_trailing_comma() {
        assert_eq!(
            parse_token_line("02,17,02,ab,cd,91"),
            Ok(vec![0x02, 0x17, 0x02, 0xab, 0xcd, 0x91])
        );
        assert_eq!(parse_token_line("bb, 40 ,00,"), Ok(vec![0xbb, 0x40, 0x00]));
        assert_eq!(parse_token_line("   "), Ok(Vec::new()));
    }
}
