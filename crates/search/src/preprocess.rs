//! German stopword removal that keeps negations.
//!
//! Dropping "nicht" from "baby schläft nicht" turns a question about a
//! sleep problem into one about sleep in general, so negation words are
//! kept even though they appear in the stopword list.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Words that negate meaning; never removed.
pub const NEGATIONS: &[&str] = &["nicht", "kein", "keine", "ohne", "nein"];

/// Common German function words with no discriminating value.
pub const STOPWORDS: &[&str] = &[
    // Articles and determiners
    "der", "die", "das", "den", "dem", "des", "ein", "eine", "einer", "eines", "einem", "einen",
    "dies", "diese", "dieser", "dieses", "diesem", "diesen", "jede", "jeder", "jedes", "jedem",
    "jeden", "alle", "allem", "allen", "aller", "alles", "manche", "mancher", "manches",
    "solche", "solcher", "solches", "welche", "welcher", "welches",
    // Pronouns
    "ich", "mich", "mir", "du", "dich", "dir", "er", "ihn", "ihm", "sie", "es", "wir", "uns",
    "ihr", "euch", "ihnen", "man", "sich", "mein", "meine", "meiner", "meines", "meinem",
    "meinen", "dein", "deine", "deinem", "deinen", "sein", "seine", "seinem", "seinen", "ihre",
    "ihrem", "ihren", "unser", "unsere", "unserem", "unseren", "euer", "eure",
    // Prepositions
    "an", "am", "auf", "aus", "bei", "beim", "bis", "durch", "für", "gegen", "hinter", "in",
    "im", "ins", "mit", "nach", "über", "um", "unter", "von", "vom", "vor", "zu", "zum", "zur",
    "zwischen", "während",
    // Conjunctions
    "und", "oder", "aber", "als", "also", "dass", "daß", "denn", "doch", "ob", "sondern",
    "weil", "wenn", "damit", "indem",
    // Auxiliaries and modals
    "bin", "bist", "ist", "sind", "seid", "war", "warst", "waren", "gewesen", "habe", "hab",
    "hast", "hat", "haben", "hatte", "hatten", "werde", "wirst", "wird", "werden", "wurde",
    "würde", "würden", "kann", "kannst", "können", "könnte", "muss", "musste", "soll",
    "sollte", "will", "wollen", "wollte",
    // Adverbs and particles
    "auch", "da", "dann", "dort", "hier", "hin", "jetzt", "noch", "nun", "nur", "schon",
    "sehr", "so", "sonst", "wieder", "zwar", "etwas", "nichts", "selbst", "ja", "mal",
    // Question words
    "was", "wie", "wo", "wer", "wann",
    // Negations (kept by the filter, listed for completeness)
    "nicht", "kein", "keine", "ohne", "nein",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());
static NEGATION_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| NEGATIONS.iter().copied().collect());

/// Lower-case `query` and drop stopwords, keeping negations.
///
/// Words are compared with surrounding punctuation trimmed ("nicht," is
/// still a negation) but kept as typed.
pub fn preprocess(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| keep(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn keep(word: &str) -> bool {
    let bare = word.trim_matches(|c: char| !c.is_alphanumeric());
    if bare.is_empty() {
        // Pure punctuation carries no search value
        return false;
    }
    NEGATION_SET.contains(bare) || !STOPWORD_SET.contains(bare)
}
