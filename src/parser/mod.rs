pub mod latex;
pub mod words;

use crate::config::SpellCheckConfig;

/// Half-open byte interval of document text excluded from spell checking
/// (LaTeX syntax, math, citations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipRange {
    pub start: usize,
    pub end: usize,
}

impl SkipRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A maximal span of prose between skip ranges. `start_offset` maps
/// region-local positions back to absolute document offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckableRegion {
    pub text: String,
    pub start_offset: usize,
}

/// Sort ranges by start offset and merge overlapping or adjacent ones into
/// a disjoint ascending list.
pub fn merge_ranges(mut ranges: Vec<SkipRange>) -> Vec<SkipRange> {
    ranges.retain(|r| !r.is_empty());
    if ranges.is_empty() {
        return ranges;
    }

    ranges.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<SkipRange> = Vec::with_capacity(ranges.len());
    let mut current = ranges[0];

    for range in ranges.into_iter().skip(1) {
        if range.start <= current.end {
            current.end = current.end.max(range.end);
        } else {
            merged.push(current);
            current = range;
        }
    }
    merged.push(current);

    merged
}

/// Invert a merged skip-range list into the checkable regions it leaves
/// uncovered. With no skip ranges the whole document is one region.
pub fn invert_ranges(text: &str, merged: &[SkipRange]) -> Vec<CheckableRegion> {
    let mut regions = Vec::new();
    let mut cursor = 0;

    for range in merged {
        if range.start > cursor {
            regions.push(CheckableRegion {
                text: text[cursor..range.start].to_string(),
                start_offset: cursor,
            });
        }
        cursor = cursor.max(range.end);
    }

    if cursor < text.len() {
        regions.push(CheckableRegion {
            text: text[cursor..].to_string(),
            start_offset: cursor,
        });
    }

    regions
}

/// Full region pass: collect skip ranges for the enabled categories, merge
/// them, and return the checkable complement.
pub fn checkable_regions(text: &str, config: &SpellCheckConfig) -> Vec<CheckableRegion> {
    let merged = merge_ranges(latex::collect_skip_ranges(text, config));
    invert_ranges(text, &merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: usize, end: usize) -> SkipRange {
        SkipRange::new(start, end)
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_ranges(vec![r(5, 10), r(0, 6), r(20, 25)]);
        assert_eq!(merged, vec![r(0, 10), r(20, 25)]);
    }

    #[test]
    fn test_merge_adjacent() {
        let merged = merge_ranges(vec![r(0, 5), r(5, 9)]);
        assert_eq!(merged, vec![r(0, 9)]);
    }

    #[test]
    fn test_merge_contained() {
        let merged = merge_ranges(vec![r(0, 20), r(3, 7), r(8, 12)]);
        assert_eq!(merged, vec![r(0, 20)]);
    }

    #[test]
    fn test_merge_is_sorted_and_disjoint() {
        let merged = merge_ranges(vec![r(30, 40), r(0, 4), r(2, 8), r(10, 12)]);
        for pair in merged.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn test_merge_preserves_coverage() {
        let input = vec![r(1, 4), r(3, 9), r(9, 10), r(15, 16)];
        let merged = merge_ranges(input.clone());

        let covered = |ranges: &[SkipRange], i: usize| ranges.iter().any(|r| r.start <= i && i < r.end);
        for i in 0..20 {
            assert_eq!(covered(&input, i), covered(&merged, i), "offset {}", i);
        }
    }

    #[test]
    fn test_invert_no_skips_yields_whole_document() {
        let regions = invert_ranges("plain prose only", &[]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].start_offset, 0);
        assert_eq!(regions[0].text, "plain prose only");
    }

    #[test]
    fn test_invert_covers_exact_complement() {
        let text = "abcdefghij";
        let merged = vec![r(2, 4), r(7, 9)];
        let regions = invert_ranges(text, &merged);

        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].text, "ab");
        assert_eq!(regions[1].text, "efg");
        assert_eq!(regions[1].start_offset, 4);
        assert_eq!(regions[2].text, "j");

        // Regions plus skips reconstruct the document with no gaps or overlaps.
        let region_len: usize = regions.iter().map(|rg| rg.text.len()).sum();
        let skip_len: usize = merged.iter().map(|s| s.len()).sum();
        assert_eq!(region_len + skip_len, text.len());
    }

    #[test]
    fn test_invert_skip_at_both_ends() {
        let text = "abcdef";
        let regions = invert_ranges(text, &[r(0, 2), r(4, 6)]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "cd");
        assert_eq!(regions[0].start_offset, 2);
    }

    #[test]
    fn test_partition_property_on_real_document() {
        let text = r"\section{Intro} The flux $\phi$ rises. \cite{smith2020} More text.";
        let merged = merge_ranges(latex::collect_skip_ranges(text, &SpellCheckConfig::default()));
        let regions = invert_ranges(text, &merged);

        let region_len: usize = regions.iter().map(|rg| rg.text.len()).sum();
        let skip_len: usize = merged.iter().map(|s| s.len()).sum();
        assert_eq!(region_len + skip_len, text.len());

        // Offsets round-trip: each region's text is found verbatim at its offset.
        for region in &regions {
            assert_eq!(&text[region.start_offset..region.start_offset + region.text.len()], region.text);
        }
    }
}
