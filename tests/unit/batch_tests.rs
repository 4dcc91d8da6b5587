/*!
 * Unit tests for the batch planner
 */

use sublocalizer::translation::batch::{plan_batches, PendingEntry};

fn entry(text: &str) -> PendingEntry {
    PendingEntry {
        text: text.to_string(),
        indexes: vec![0],
        cache_key: format!("en::tr::{}", text),
    }
}

fn batch_texts(batch: &[PendingEntry]) -> Vec<&str> {
    batch.iter().map(|e| e.text.as_str()).collect()
}

#[test]
fn test_planBatches_charBudget_shouldSplitWhenExceeded() {
    // Lengths 5, 5, 1 against a 10-char budget
    let entries = vec![entry("abcde"), entry("fghij"), entry("k")];
    let batches = plan_batches(entries, 10, 4);

    assert_eq!(batches.len(), 2);
    assert_eq!(batch_texts(&batches[0]), vec!["abcde", "fghij"]);
    assert_eq!(batch_texts(&batches[1]), vec!["k"]);
}

#[test]
fn test_planBatches_itemBudget_shouldCapBatchSize() {
    let entries = vec![entry("a"), entry("b"), entry("c"), entry("d"), entry("e")];
    let batches = plan_batches(entries, 1000, 2);

    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].len(), 2);
    assert_eq!(batches[1].len(), 2);
    assert_eq!(batches[2].len(), 1);
}

#[test]
fn test_planBatches_shouldPreserveEntryOrder() {
    let entries = vec![entry("first"), entry("second"), entry("third"), entry("fourth")];
    let batches = plan_batches(entries, 11, 10);

    let flattened: Vec<&str> = batches.iter().flat_map(|b| batch_texts(b)).collect();
    assert_eq!(flattened, vec!["first", "second", "third", "fourth"]);
}

#[test]
fn test_planBatches_everyBatch_shouldStayWithinBudgets() {
    let entries: Vec<PendingEntry> = (0..30)
        .map(|i| entry(&"x".repeat(1 + i % 7)))
        .collect();
    let batches = plan_batches(entries, 12, 4);

    for batch in &batches {
        assert!(batch.len() <= 4);
        let chars: usize = batch.iter().map(|e| e.text.chars().count()).sum();
        assert!(chars <= 12);
    }
}

#[test]
fn test_planBatches_shouldNeverDropEntries() {
    let entries: Vec<PendingEntry> = (0..17).map(|i| entry(&format!("text {}", i))).collect();
    let batches = plan_batches(entries, 20, 3);

    let total: usize = batches.iter().map(|b| b.len()).sum();
    assert_eq!(total, 17);
}

#[test]
fn test_planBatches_singleEntryOverBudget_shouldStillBePlanned() {
    let entries = vec![entry(&"x".repeat(100))];
    let batches = plan_batches(entries, 10, 10);

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
}
