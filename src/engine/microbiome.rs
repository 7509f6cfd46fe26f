//! Gut microbiome diversity.

use super::{require_finite, round_to};
use crate::BioTwinError;

/// Shannon diversity index `-Σ pᵢ ln pᵢ` over bacterial counts, rounded to
/// 3 decimals. Zero-count taxa are skipped; an empty sample scores 0.
///
/// # Errors
/// Returns `InvalidArgument` for negative or non-finite counts.
pub fn shannon_index<'a, I>(counts: I) -> crate::Result<f64>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut positive = Vec::new();
    for (taxon, count) in counts {
        require_finite(taxon, count)?;
        if count < 0.0 {
            return Err(BioTwinError::InvalidArgument(format!(
                "count for {taxon} must be non-negative, got {count}"
            )));
        }
        if count > 0.0 {
            positive.push(count);
        }
    }

    let total: f64 = positive.iter().sum();
    if total == 0.0 {
        return Ok(0.0);
    }

    let entropy: f64 = positive
        .iter()
        .map(|c| {
            let p = c / total;
            -p * p.ln()
        })
        .sum();
    Ok(round_to(entropy, 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_community() {
        let h = shannon_index([("bacteroides", 50.0), ("firmicutes", 50.0)]).unwrap();
        assert_eq!(h, 0.693);
    }

    #[test]
    fn test_single_taxon_and_empty() {
        assert_eq!(shannon_index([("lactobacillus", 12.0)]).unwrap(), 0.0);
        assert_eq!(shannon_index(Vec::<(&str, f64)>::new()).unwrap(), 0.0);
        assert_eq!(shannon_index([("a", 0.0), ("b", 0.0)]).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_counts_ignored() {
        let with_zero = shannon_index([("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 0.0)]).unwrap();
        assert_eq!(with_zero, 1.099);
    }

    #[test]
    fn test_negative_count_rejected() {
        assert!(shannon_index([("a", -1.0)]).is_err());
    }
}
