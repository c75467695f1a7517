//! Legacy on-disk table reader: little-endian, record-length-framed mixed
//! int/float records, as produced by the original table generator.
//!
//! Each record is a run of 4-byte words, framed front and back by an
//! identical 4-byte little-endian record length (in bytes, not counting the
//! framing words themselves). A mismatch between the leading and trailing
//! lengths is a malformed file.

use crate::error::ModelError;
use std::path::Path;

fn read_i32(data: &[u8], offset: usize) -> Result<i32, ModelError> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .ok_or_else(|| ModelError::MalformedFile(format!("truncated i32 at offset {offset}")))?
        .try_into()
        .unwrap();
    Ok(i32::from_le_bytes(bytes))
}

/// One record of the legacy framed format: the raw word payload, with the
/// leading/trailing length words already validated and stripped.
#[derive(Debug, Clone)]
pub struct LegacyRecord {
    pub words: Vec<[u8; 4]>,
}

impl LegacyRecord {
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn as_i32(&self, index: usize) -> Result<i32, ModelError> {
        let word = self.words.get(index).ok_or_else(|| {
            ModelError::MalformedFile(format!("record has no word {index}"))
        })?;
        Ok(i32::from_le_bytes(*word))
    }

    pub fn as_f32(&self, index: usize) -> Result<f32, ModelError> {
        let word = self.words.get(index).ok_or_else(|| {
            ModelError::MalformedFile(format!("record has no word {index}"))
        })?;
        Ok(f32::from_le_bytes(*word))
    }
}

/// Split `data` into framed records, validating that each record's leading
/// and trailing length words agree.
pub fn read_framed_records(data: &[u8]) -> Result<Vec<LegacyRecord>, ModelError> {
    let mut records = Vec::new();
    let mut offset = 0usize;
    while offset < data.len() {
        let leading_len = read_i32(data, offset)? as usize;
        offset += 4;
        if leading_len % 4 != 0 {
            return Err(ModelError::MalformedFile(format!(
                "record length {leading_len} at offset {offset} is not word-aligned"
            )));
        }
        let payload_end = offset
            .checked_add(leading_len)
            .ok_or_else(|| ModelError::MalformedFile("record length overflow".into()))?;
        if payload_end + 4 > data.len() {
            return Err(ModelError::MalformedFile(
                "record payload runs past end of file".into(),
            ));
        }
        let mut words = Vec::with_capacity(leading_len / 4);
        let mut word_offset = offset;
        while word_offset < payload_end {
            let word: [u8; 4] = data[word_offset..word_offset + 4].try_into().unwrap();
            words.push(word);
            word_offset += 4;
        }
        let trailing_len = read_i32(data, payload_end)? as usize;
        if trailing_len != leading_len {
            return Err(ModelError::MalformedFile(format!(
                "record framing mismatch: leading {leading_len} != trailing {trailing_len}"
            )));
        }
        records.push(LegacyRecord { words });
        offset = payload_end + 4;
    }
    Ok(records)
}

/// Read and frame-validate a legacy header/table file from disk.
pub fn read_legacy_file(path: &Path) -> Result<Vec<LegacyRecord>, ModelError> {
    let data = std::fs::read(path)?;
    read_framed_records(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(words: &[[u8; 4]]) -> Vec<u8> {
        let mut out = Vec::new();
        let len = (words.len() * 4) as i32;
        out.extend_from_slice(&len.to_le_bytes());
        for w in words {
            out.extend_from_slice(w);
        }
        out.extend_from_slice(&len.to_le_bytes());
        out
    }

    #[test]
    fn reads_a_single_well_formed_record() {
        let data = framed(&[1i32.to_le_bytes(), 2i32.to_le_bytes(), 3i32.to_le_bytes()]);
        let records = read_framed_records(&data).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_i32(0).unwrap(), 1);
        assert_eq!(records[0].as_i32(2).unwrap(), 3);
    }

    #[test]
    fn reads_float_words() {
        let data = framed(&[1.5f32.to_le_bytes(), (-2.25f32).to_le_bytes()]);
        let records = read_framed_records(&data).unwrap();
        assert!((records[0].as_f32(0).unwrap() - 1.5).abs() < 1e-6);
        assert!((records[0].as_f32(1).unwrap() + 2.25).abs() < 1e-6);
    }

    #[test]
    fn rejects_framing_mismatch() {
        let mut data = framed(&[1i32.to_le_bytes()]);
        let last = data.len() - 1;
        data[last] = data[last].wrapping_add(1);
        assert!(read_framed_records(&data).is_err());
    }

    #[test]
    fn reads_consecutive_records() {
        let mut data = framed(&[1i32.to_le_bytes()]);
        data.extend(framed(&[2i32.to_le_bytes(), 3i32.to_le_bytes()]));
        let records = read_framed_records(&data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].word_count(), 2);
    }
}
