//! DNA sequence helpers: validation, transcription and marker screening.

use std::collections::BTreeSet;

use crate::domain::GeneticProfile;

/// Nucleotide codes accepted in a sequence (N = unknown base).
const VALID_BASES: &[char] = &['A', 'T', 'C', 'G', 'N'];

/// Number of leading bases kept in a profile snippet.
const SNIPPET_LEN: usize = 12;

/// Annotated marker → reported risk.
const RISK_MARKERS: [(&str, &str); 2] = [
    ("BRCA1", "Breast Cancer Risk"),
    ("BRCA2", "Breast Cancer Risk"),
];

/// Partial codon table; `None` marks a stop codon.
const CODON_TABLE: [(&str, Option<&str>); 8] = [
    ("AUG", Some("Met")),
    ("UUU", Some("Phe")),
    ("UUC", Some("Phe")),
    ("UUA", Some("Leu")),
    ("UUG", Some("Leu")),
    ("UAA", None),
    ("UAG", None),
    ("UGA", None),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneticSequencer;

impl GeneticSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// DNA → mRNA (T replaced by U).
    #[must_use]
    pub fn transcribe(&self, dna: &str) -> String {
        dna.to_ascii_uppercase().replace('T', "U")
    }

    /// mRNA → amino acids, reading frame 0 until the first stop codon.
    ///
    /// Codons missing from the table are skipped.
    #[must_use]
    pub fn translate_rna(&self, mrna: &str) -> Vec<&'static str> {
        let bases: Vec<char> = mrna.chars().map(|c| c.to_ascii_uppercase()).collect();
        let mut protein = Vec::new();

        for codon in bases.chunks_exact(3) {
            let codon: String = codon.iter().collect();
            match CODON_TABLE.iter().find(|(c, _)| *c == codon) {
                Some((_, Some(amino))) => protein.push(*amino),
                Some((_, None)) => break,
                None => {}
            }
        }
        protein
    }

    /// True if every character is one of A, T, C, G, N (case-insensitive).
    #[must_use]
    pub fn validate_dna(&self, sequence: &str) -> bool {
        sequence
            .chars()
            .all(|c| VALID_BASES.contains(&c.to_ascii_uppercase()))
    }

    /// Risks implied by annotated markers in the sequence.
    #[must_use]
    pub fn analyze_risk(&self, dna: &str) -> BTreeSet<String> {
        let upper = dna.to_ascii_uppercase();
        RISK_MARKERS
            .iter()
            .filter(|(marker, _)| upper.contains(marker))
            .map(|(_, risk)| (*risk).to_string())
            .collect()
    }

    /// Up to the first 12 bases, followed by `...`.
    #[must_use]
    pub fn snippet(&self, dna: &str) -> String {
        let head: String = dna
            .chars()
            .take(SNIPPET_LEN)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        format!("{head}...")
    }

    /// Build a genetic profile for the twin.
    #[must_use]
    pub fn profile(
        &self,
        dna: &str,
        mut detected_mutations: BTreeSet<String>,
        epigenetic_age: f64,
    ) -> GeneticProfile {
        if !self.validate_dna(dna) {
            tracing::warn!("DNA sequence contains non-nucleotide symbols");
        }
        detected_mutations.extend(self.analyze_risk(dna));

        GeneticProfile {
            dna_snippet: self.snippet(dna),
            detected_mutations,
            epigenetic_age,
        }
    }
}
