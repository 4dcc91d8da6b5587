/*!
 * Near-duplicate grouping of source texts.
 *
 * Subtitle files repeat lines constantly (recaps, songs, interjections), so
 * before anything is sent to a backend the input is collapsed into unique
 * texts plus the groups of original indices that share each of them.
 */

/// Default similarity threshold for joining a group
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.985;

/// Result of deduplicating an ordered list of texts
#[derive(Debug, Clone, PartialEq)]
pub struct DeduplicationResult {
    /// Distinct texts in first-seen order, keeping the original formatting
    pub unique_texts: Vec<String>,

    /// For each unique text, the original indices mapping to it.
    /// The groups partition `0..texts.len()` exactly.
    pub groups: Vec<Vec<usize>>,
}

impl DeduplicationResult {
    /// Total number of original indices covered by the groups
    pub fn total_indices(&self) -> usize {
        self.groups.iter().map(|group| group.len()).sum()
    }
}

/// Group near-identical texts so each unique text is translated once.
///
/// Each candidate is whitespace-trimmed and compared against the first-seen
/// texts as they were accepted; exact equality always matches, otherwise a
/// normalized edit-distance ratio is compared against the threshold. The
/// first-seen text is kept as the group's canonical text so its formatting
/// and casing survive to the translation call.
///
/// Complexity is O(U²) in the number of unique texts, which is acceptable
/// for subtitle-sized workloads.
pub fn deduplicate_texts(texts: &[String], similarity_threshold: f64) -> DeduplicationResult {
    let mut unique: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, text) in texts.iter().enumerate() {
        let normalized = text.trim();
        match find_match(normalized, &unique, similarity_threshold) {
            Some(match_index) => groups[match_index].push(idx),
            None => {
                unique.push(text.clone());
                groups.push(vec![idx]);
            }
        }
    }

    DeduplicationResult {
        unique_texts: unique,
        groups,
    }
}

/// Find the first accepted unique text the candidate matches, if any
fn find_match(candidate: &str, pool: &[String], threshold: f64) -> Option<usize> {
    for (i, other) in pool.iter().enumerate() {
        if candidate == other {
            return Some(i);
        }
        if similarity_ratio(candidate, other) >= threshold {
            return Some(i);
        }
    }
    None
}

/// Similarity ratio between two strings in [0.0, 1.0]
///
/// Uses normalized Levenshtein distance over characters. Unlike fuzzy
/// glossary matching this is case-sensitive: "Hello" and "hello" are close
/// but not identical lines.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein_distance(a, b);
    let max_len = a.chars().count().max(b.chars().count());

    1.0 - (distance as f64 / max_len as f64)
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use two-row optimization for space efficiency
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1)                  // deletion
                .min(curr_row[j - 1] + 1)                    // insertion
                .min(prev_row[j - 1] + cost);                // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
