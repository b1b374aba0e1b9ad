use std::io::Read;
use std::str::Utf8Error;

use csv::{ByteRecord, Reader, ReaderBuilder};
use tracing::warn;

use crate::errors::LoadError;

pub(crate) fn csv_reader<R: Read>(source: R) -> Reader<R> {
    // Field counts are checked per row so a short or long row can be skipped.
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source)
}

pub(crate) fn skip_header<R: Read>(
    loader: &'static str,
    reader: &mut Reader<R>,
) -> Result<(), LoadError> {
    let mut header = ByteRecord::new();
    match reader.read_byte_record(&mut header) {
        Ok(true) => Ok(()),
        Ok(false) => Err(LoadError::MissingHeader { loader }),
        Err(source) => Err(LoadError::Header { loader, source }),
    }
}

/// Reads the next data row. Returns `false` at end of input or on a read
/// error, which ends the load with whatever has been collected. Rows are read
/// as bytes; field encoding is checked by the loaders like any other value.
pub(crate) fn next_row<R: Read>(
    loader: &'static str,
    reader: &mut Reader<R>,
    record: &mut ByteRecord,
) -> bool {
    match reader.read_byte_record(record) {
        Ok(more) => more,
        Err(err) => {
            warn!(loader, error = %err, "Stopped reading after CSV error");
            false
        }
    }
}

pub(crate) fn line_of(record: &ByteRecord) -> u64 {
    record.position().map(|pos| pos.line()).unwrap_or_default()
}

/// Field `index` as trimmed UTF-8. Callers check the field count first.
pub(crate) fn field(record: &ByteRecord, index: usize) -> Result<&str, Utf8Error> {
    std::str::from_utf8(&record[index]).map(str::trim)
}

/// Lossy rendering of a field that failed to decode, for diagnostics.
pub(crate) fn lossy_field(record: &ByteRecord, index: usize) -> String {
    String::from_utf8_lossy(&record[index]).trim().to_string()
}
