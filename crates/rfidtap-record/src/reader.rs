use std::io::BufRead;

use rfidtap_frame::parse_token_line;

use crate::SessionLogError;

/// Reads a session log back into raw chunks, skipping blank separator lines.
pub fn read_records<R: BufRead>(source: R) -> Result<Vec<Vec<u8>>, SessionLogError> {
    let mut records = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record = parse_token_line(&line).map_err(|source| SessionLogError::MalformedRecord {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}
