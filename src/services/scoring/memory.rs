//! Working-memory span scoring.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryScore {
    /// Percentage of exactly reproduced sequences.
    pub pct: f64,
    /// Longest correctly reproduced sequence, not merely the longest
    /// attempted.
    pub max_span: i32,
}

/// `results` holds one `(correct, sequence_length)` entry per answered item.
pub fn score(results: &[(bool, i32)]) -> MemoryScore {
    if results.is_empty() {
        return MemoryScore::default();
    }

    let total = results.len() as f64;
    let correct = results.iter().filter(|(ok, _)| *ok).count() as f64;
    let max_span = results
        .iter()
        .filter(|(ok, _)| *ok)
        .map(|(_, len)| *len)
        .max()
        .unwrap_or(0);

    MemoryScore {
        pct: correct / total * 100.0,
        max_span,
    }
}
