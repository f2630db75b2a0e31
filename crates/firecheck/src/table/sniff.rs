//! Delimiter detection for uploaded spreadsheets.
//!
//! Crew, equipment and task lists arrive as whatever the spreadsheet program
//! exported: comma, tab, semicolon or pipe separated. The sniffer looks at the
//! leading sample and picks the candidate that splits every record into the
//! same, non-zero number of cells.

/// How many leading bytes are inspected.
pub const SAMPLE_BYTES: usize = 4096;

/// Delimiters considered, in tie-break order.
pub const CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Delimiter used when nothing can be detected.
pub const FALLBACK: u8 = b',';

/// Records beyond this many are not inspected.
const MAX_RECORDS: usize = 20;

/// Guess the delimiter of a delimited text sample.
///
/// Returns `None` when no candidate appears a consistent number of times in
/// every complete record of the sample.
#[must_use]
pub fn sniff_delimiter(sample: &[u8]) -> Option<u8> {
    let truncated = sample.len() >= SAMPLE_BYTES;
    let sample = &sample[..sample.len().min(SAMPLE_BYTES)];
    let records = count_per_record(sample, truncated);
    if records.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for (idx, &candidate) in CANDIDATES.iter().enumerate() {
        let first = records[0][idx];
        if first == 0 || records.iter().any(|counts| counts[idx] != first) {
            continue;
        }
        if best.map_or(true, |(_, count)| first > count) {
            best = Some((candidate, first));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// The sniffed delimiter, or [`FALLBACK`].
#[must_use]
pub fn delimiter_or_default(sample: &[u8]) -> u8 {
    sniff_delimiter(sample).unwrap_or(FALLBACK)
}

/// Count each candidate outside quoted fields, per non-blank record.
///
/// A `"` opens a quoted field only at the start of a field, that is at the
/// start of a record or right after a candidate delimiter. Anywhere else it is
/// a literal character (`2.5" hose`). Inside a quoted field `""` is an escaped
/// quote.
///
/// When the sample was cut short, the trailing partial record is dropped.
fn count_per_record(sample: &[u8], truncated: bool) -> Vec<[usize; 4]> {
    let mut records = Vec::new();
    let mut counts = [0usize; 4];
    let mut in_quotes = false;
    let mut closed_quote = false;
    let mut field_start = true;
    let mut blank = true;

    for &byte in sample {
        if in_quotes {
            if byte == b'"' {
                in_quotes = false;
                closed_quote = true;
            }
            continue;
        }
        if closed_quote && byte == b'"' {
            in_quotes = true;
            closed_quote = false;
            continue;
        }
        closed_quote = false;

        match byte {
            b'"' if field_start => {
                in_quotes = true;
                field_start = false;
                blank = false;
            }
            b'\n' => {
                if !blank {
                    records.push(counts);
                }
                counts = [0; 4];
                field_start = true;
                blank = true;
            }
            b'\r' => {}
            _ => {
                if let Some(idx) = CANDIDATES.iter().position(|&c| c == byte) {
                    counts[idx] += 1;
                    field_start = true;
                } else {
                    field_start = false;
                }
                if !byte.is_ascii_whitespace() {
                    blank = false;
                }
            }
        }
        if records.len() == MAX_RECORDS {
            return records;
        }
    }

    if !blank && !truncated {
        records.push(counts);
    }
    records
}
