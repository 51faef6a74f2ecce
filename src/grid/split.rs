//! Column partitioning at the widest whitespace gaps.

/// Split sorted vertical line positions into `sections` runs, cutting at the
/// `sections − 1` widest gaps between neighbours.
///
/// The line left of a cut closes the earlier run, the line right of it opens
/// the next one. Equal gaps resolve to the leftmost. Returns `None` when there
/// are fewer gaps than cuts.
pub fn split_at_widest_gaps(lines: &[usize], sections: usize) -> Option<Vec<&[usize]>> {
    if sections == 0 {
        return None;
    }
    let cuts = sections - 1;
    if lines.len().saturating_sub(1) < cuts {
        return None;
    }

    let mut gaps: Vec<(usize, usize)> = lines
        .windows(2)
        .enumerate()
        .map(|(i, pair)| (pair[1].saturating_sub(pair[0]), i))
        .collect();
    // Widest first, then leftmost.
    gaps.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    let mut cut_after: Vec<usize> = gaps.iter().take(cuts).map(|&(_, i)| i).collect();
    cut_after.sort_unstable();

    let mut out = Vec::with_capacity(sections);
    let mut start = 0usize;
    for i in cut_after {
        out.push(&lines[start..=i]);
        start = i + 1;
    }
    out.push(&lines[start..]);
    Some(out)
}
