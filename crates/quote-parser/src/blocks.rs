use chrono::NaiveDate;

use crate::calendar::QuoteCalendar;
use crate::dates::parse_date_from_line;

/// Contiguous run of lines attributed to one detected date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBlock {
    pub date: Option<NaiveDate>,
    pub lines: Vec<String>,
}

impl DateBlock {
    /// ISO date, or an empty string for an undated block
    pub fn iso_date(&self) -> String {
        self.date.map(QuoteCalendar::iso).unwrap_or_default()
    }
}

/// Partition lines into one block per recognized date.
///
/// Every date line opens a new block and owns the lines up to the next date
/// line. Lines before the first date belong to no block. A document without
/// any date becomes a single undated block holding every line.
pub fn split_into_date_blocks(lines: &[String], today: NaiveDate) -> Vec<DateBlock> {
    let mut blocks: Vec<DateBlock> = Vec::new();

    for line in lines {
        match parse_date_from_line(line, today) {
            Some(date) => blocks.push(DateBlock {
                date: Some(date),
                lines: vec![line.clone()],
            }),
            None => {
                if let Some(open) = blocks.last_mut() {
                    open.lines.push(line.clone());
                }
            }
        }
    }

    if blocks.is_empty() {
        blocks.push(DateBlock {
            date: None,
            lines: lines.to_vec(),
        });
    }

    blocks
}
