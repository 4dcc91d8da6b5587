/*!
 * Unit tests for near-duplicate grouping
 */

use sublocalizer::translation::dedup::{
    deduplicate_texts, similarity_ratio, DEFAULT_SIMILARITY_THRESHOLD,
};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_deduplicateTexts_exactDuplicates_shouldCollapseIntoOneGroup() {
    let input = texts(&["Hello", "Hello", "Hi"]);
    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(result.unique_texts, texts(&["Hello", "Hi"]));
    assert_eq!(result.groups, vec![vec![0, 1], vec![2]]);
}

#[test]
fn test_deduplicateTexts_duplicatesApart_shouldCollapseRegardlessOfPosition() {
    let input = texts(&["Hello", "Goodbye", "Hello", "Goodbye", "Hello"]);
    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(result.unique_texts.len(), 2);
    assert_eq!(result.groups[0], vec![0, 2, 4]);
    assert_eq!(result.groups[1], vec![1, 3]);
}

#[test]
fn test_deduplicateTexts_nearDuplicates_shouldCollapseAboveThreshold() {
    // One character changed over a long line keeps the ratio above 0.985
    let base = "This is a very long subtitle line that repeats in the recap of every single episode";
    let variant = base.replace("episode", "episodes");
    let input = vec![base.to_string(), variant];

    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(result.unique_texts.len(), 1);
    assert_eq!(result.groups, vec![vec![0, 1]]);
}

#[test]
fn test_deduplicateTexts_distinctShortTexts_shouldStaySeparate() {
    let input = texts(&["Hello", "Hi"]);
    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(result.unique_texts.len(), 2);
    assert_eq!(result.groups, vec![vec![0], vec![1]]);
}

#[test]
fn test_deduplicateTexts_groups_shouldPartitionAllIndices() {
    let input = texts(&["a", "b", "a", "c", "b", "a", "d"]);
    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(result.total_indices(), input.len());

    let mut seen: Vec<usize> = result.groups.iter().flatten().copied().collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..input.len()).collect::<Vec<_>>());
}

#[test]
fn test_deduplicateTexts_emptyInput_shouldYieldNothing() {
    let result = deduplicate_texts(&[], DEFAULT_SIMILARITY_THRESHOLD);
    assert!(result.unique_texts.is_empty());
    assert!(result.groups.is_empty());
}

#[test]
fn test_deduplicateTexts_paddedDuplicateOfCleanText_shouldJoinFirstSeenGroup() {
    // Candidates are trimmed before comparison, so the padded repeat maps
    // onto the clean first-seen text
    let input = texts(&["Hello", "  Hello  "]);
    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(result.unique_texts, texts(&["Hello"]));
    assert_eq!(result.groups, vec![vec![0, 1]]);
}

#[test]
fn test_deduplicateTexts_paddedFirstSeenText_shouldKeepItsFormatting() {
    // First-seen texts are stored as given; a later clean repeat is
    // compared against the padded form and stays its own group
    let input = texts(&["Hello ", "Hello"]);
    let result = deduplicate_texts(&input, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(result.unique_texts, texts(&["Hello ", "Hello"]));
    assert_eq!(result.groups, vec![vec![0], vec![1]]);
}

#[test]
fn test_deduplicateTexts_lowerThreshold_shouldGroupMoreAggressively() {
    let input = texts(&["translation", "translations"]);

    let strict = deduplicate_texts(&input, 0.99);
    assert_eq!(strict.unique_texts.len(), 2);

    let loose = deduplicate_texts(&input, 0.9);
    assert_eq!(loose.unique_texts.len(), 1);
}

#[test]
fn test_similarityRatio_shouldBeSymmetric() {
    let a = "Where were you last night?";
    let b = "Where were you last nights?";
    assert!((similarity_ratio(a, b) - similarity_ratio(b, a)).abs() < f64::EPSILON);
}
