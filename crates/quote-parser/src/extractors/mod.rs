//! Per-field extractors over the lines of one date block
//!
//! Each extractor is a pure function of its lines. A field is read by a
//! [`Chain`] of extractors tried in order until one yields a value.

pub mod day;
pub mod guests;
pub mod meal;
pub mod numeric;
pub mod rental;
pub mod time;
pub mod total;

/// One heuristic reading a single field from a run of lines
pub trait FieldExtractor {
    type Output;

    fn extract(&self, lines: &[String]) -> Option<Self::Output>;
}

/// Extractors tried in order; the first value wins
pub struct Chain<'a, T> {
    steps: Vec<Box<dyn FieldExtractor<Output = T> + 'a>>,
}

impl<'a, T> Chain<'a, T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn then<E>(mut self, step: E) -> Self
    where
        E: FieldExtractor<Output = T> + 'a,
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<T> Default for Chain<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldExtractor for Chain<'_, T> {
    type Output = T;

    fn extract(&self, lines: &[String]) -> Option<T> {
        self.steps.iter().find_map(|step| step.extract(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<u32>);

    impl FieldExtractor for Fixed {
        type Output = u32;

        fn extract(&self, _lines: &[String]) -> Option<u32> {
            self.0
        }
    }

    struct LineCount;

    impl FieldExtractor for LineCount {
        type Output = u32;

        fn extract(&self, lines: &[String]) -> Option<u32> {
            Some(lines.len() as u32)
        }
    }

    #[test]
    fn test_chain_returns_first_value() {
        let chain = Chain::new().then(Fixed(None)).then(Fixed(Some(7))).then(Fixed(Some(9)));
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.extract(&[]), Some(7));
    }

    #[test]
    fn test_chain_passes_lines_through() {
        let chain = Chain::new().then(Fixed(None)).then(LineCount);
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(chain.extract(&lines), Some(2));
    }

    #[test]
    fn test_empty_chain_yields_nothing() {
        let chain: Chain<'_, u32> = Chain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.extract(&[]), None);
    }
}
