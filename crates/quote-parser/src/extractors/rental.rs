// Hall rental fee
use super::numeric::{AmountField, BLOCK_RENTAL};
use super::{Chain, FieldExtractor};
use crate::patterns::RENTAL_KEYWORD;

/// Rental fee on lines naming it: the amount after the label, else any
/// amount on that line
pub struct KeywordRental(pub AmountField);

impl FieldExtractor for KeywordRental {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        let field = &self.0;
        lines.iter().find_map(|line| {
            let label = RENTAL_KEYWORD.find(line)?;
            field
                .first_after(line, label.end())
                .or_else(|| field.first_in_line(line))
        })
    }
}

/// First amount in range on any line
pub struct AnyLineRental(pub AmountField);

impl FieldExtractor for AnyLineRental {
    type Output = u64;

    fn extract(&self, lines: &[String]) -> Option<u64> {
        lines.iter().find_map(|line| self.0.first_in_line(line))
    }
}

/// Keyword lines first, then any line; both with the block floor
pub fn block_rental_chain<'a>() -> Chain<'a, u64> {
    Chain::new()
        .then(KeywordRental(BLOCK_RENTAL))
        .then(AnyLineRental(BLOCK_RENTAL))
}
