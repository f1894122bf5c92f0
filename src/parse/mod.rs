//! Per-dataset CSV/JSON-L parsers producing raw records; schema-tolerant
//! (component F, §4.3).

pub mod dates;
pub mod delimiters;
pub mod events;
pub mod gkg;
pub mod mentions;
pub mod ngrams;
pub mod reader;

use crate::dataset::Dataset;
use crate::error::{ErrorPolicy, GdeltError};
use crate::model::raw::{RawEvent, RawGkg, RawMention, RawNGram};

/// One raw record of any dataset, so a single streaming loop in the file
/// source can stay generic over which parser it calls (§4.5).
#[derive(Debug, Clone)]
pub enum AnyRawRecord {
    Event(RawEvent),
    Mention(RawMention),
    Gkg(RawGkg),
    NGram(RawNGram),
}

/// Parses every non-blank line of `text` for `dataset`, applying
/// `error_policy` to lines that fail to parse. TSV datasets use the shared
/// line reader; NGrams treats each line as an independent JSON object.
pub fn parse_all(
    dataset: Dataset,
    text: &str,
    policy: ErrorPolicy,
) -> Result<(Vec<AnyRawRecord>, Vec<GdeltError>), GdeltError> {
    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (line_number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = match dataset {
            Dataset::Events => events::parse_raw_line(line, line_number + 1).map(AnyRawRecord::Event),
            Dataset::Mentions => {
                mentions::parse_raw_line(line, line_number + 1).map(AnyRawRecord::Mention)
            }
            Dataset::Gkg => gkg::parse_raw_line(line, line_number + 1).map(AnyRawRecord::Gkg),
            Dataset::NGrams => ngrams::parse_raw_line(line, line_number + 1).map(AnyRawRecord::NGram),
            Dataset::Graph | Dataset::Broadcast => {
                return Err(GdeltError::Configuration(format!(
                    "{dataset:?} has no shipped parser"
                )))
            }
        };

        match parsed {
            Ok(record) => records.push(record),
            Err(err) => match policy {
                ErrorPolicy::Raise => return Err(err),
                ErrorPolicy::Warn => {
                    tracing::warn!(line = line_number + 1, error = %err, "skipping malformed record");
                    errors.push(err);
                }
                ErrorPolicy::Skip => {}
            },
        }
    }

    Ok((records, errors))
}
