//! DER framing
//!
//! Neither the attestation certificate nor the signature in a raw message is
//! preceded by an explicit length, so both are measured by reading the header
//! of the DER SEQUENCE they start with.

const SEQUENCE_TAG: u8 = 0x30;

/// Failure to read a DER SEQUENCE header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerError {
    /// Input is empty or does not start with a SEQUENCE tag
    NotASequence,
    /// Length octets use a form DER forbids
    IllegalLength,
    /// Header or content extends past the end of the input
    Truncated,
}

impl std::fmt::Display for DerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DerError::NotASequence => write!(f, "not a SEQUENCE"),
            DerError::IllegalLength => write!(f, "illegal length encoding"),
            DerError::Truncated => write!(f, "truncated structure"),
        }
    }
}

/// Total encoded size of the DER SEQUENCE at the start of `data`
///
/// The returned length covers tag, length octets and content, so
/// `&data[..len]` is exactly the structure and `&data[len..]` is whatever
/// follows it.
///
/// # Errors
///
/// Returns a `DerError` if the header is not a definite-length SEQUENCE or the
/// content runs past the end of `data`.
pub fn measure_sequence(data: &[u8]) -> Result<usize, DerError> {
    match data.first() {
        Some(&SEQUENCE_TAG) => {}
        _ => return Err(DerError::NotASequence),
    }

    let (content_len, header_len) = read_length(&data[1..])?;
    let total = 1usize
        .checked_add(header_len)
        .and_then(|n| n.checked_add(content_len))
        .ok_or(DerError::IllegalLength)?;

    if total > data.len() {
        return Err(DerError::Truncated);
    }

    Ok(total)
}

/// Decode DER length octets, returning `(content_length, octets_consumed)`
fn read_length(data: &[u8]) -> Result<(usize, usize), DerError> {
    let first = *data.first().ok_or(DerError::Truncated)?;

    if first < 0x80 {
        return Ok((usize::from(first), 1));
    }

    let count = usize::from(first & 0x7f);
    // 0x80 is the indefinite form and 0xff is reserved (X.690 8.1.3.5)
    if count == 0 || count == 0x7f {
        return Err(DerError::IllegalLength);
    }
    if count > std::mem::size_of::<usize>() {
        return Err(DerError::IllegalLength);
    }
    if count >= data.len() {
        return Err(DerError::Truncated);
    }

    let octets = &data[1..=count];
    if octets[0] == 0 {
        // DER requires the minimal number of length octets
        return Err(DerError::IllegalLength);
    }

    let len = octets
        .iter()
        .fold(0usize, |acc, &byte| (acc << 8) | usize::from(byte));
    if len < 0x80 {
        return Err(DerError::IllegalLength);
    }

    Ok((len, count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_length() {
        let data = [0x30, 0x03, 0x02, 0x01, 0x05, 0xaa, 0xbb];
        assert_eq!(measure_sequence(&data), Ok(5));
    }

    #[test]
    fn test_long_form_length() {
        let mut data = vec![0x30, 0x82, 0x01, 0x3c];
        data.extend(std::iter::repeat(0u8).take(0x13c));
        data.push(0xff);
        assert_eq!(measure_sequence(&data), Ok(4 + 0x13c));
    }

    #[test]
    fn test_rejects_other_tags() {
        assert_eq!(measure_sequence(&[0x02, 0x01, 0x00]), Err(DerError::NotASequence));
        assert_eq!(measure_sequence(&[]), Err(DerError::NotASequence));
    }

    #[test]
    fn test_rejects_indefinite_and_non_minimal_lengths() {
        assert_eq!(measure_sequence(&[0x30, 0x80, 0x00, 0x00]), Err(DerError::IllegalLength));
        assert_eq!(measure_sequence(&[0x30, 0x81, 0x05, 0, 0, 0, 0, 0]), Err(DerError::IllegalLength));
        assert_eq!(measure_sequence(&[0x30, 0x82, 0x00, 0x90]), Err(DerError::IllegalLength));
    }

    #[test]
    fn test_rejects_truncated_content() {
        assert_eq!(measure_sequence(&[0x30, 0x05, 0x02, 0x01]), Err(DerError::Truncated));
        assert_eq!(measure_sequence(&[0x30, 0x82, 0x01]), Err(DerError::Truncated));
        assert_eq!(measure_sequence(&[0x30]), Err(DerError::Truncated));
    }
}
