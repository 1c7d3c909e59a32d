//! "Did you mean?" suggestions.
//!
//! Unknown field, constructor and member names are compared against the
//! schema's declared names by Levenshtein distance. Only candidates within a
//! length-scaled threshold are offered, so short typos don't pull in
//! unrelated names.

/// Levenshtein edit distance (insertions, deletions, substitutions).
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.chars().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Maximum distance worth suggesting for a name of `len` characters.
pub fn default_threshold(len: usize) -> usize {
    match len {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=10 => 3,
        n => (n / 2).min(5),
    }
}

/// All candidates within the default threshold, closest first.
///
/// Ties keep candidate order. Case-only differences count as distance 0 so
/// `Kind` suggests `kind`.
pub fn similar_names<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    similar_names_with_threshold(name, candidates, default_threshold(name.chars().count()))
}

pub fn similar_names_with_threshold<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    threshold: usize,
) -> Vec<&'a str> {
    if name.is_empty() {
        return Vec::new();
    }
    let lowered = name.to_lowercase();

    let mut scored: Vec<(usize, usize, &str)> = candidates
        .into_iter()
        .filter(|candidate| *candidate != name)
        .enumerate()
        .filter_map(|(order, candidate)| {
            if name.len().abs_diff(candidate.len()) > threshold {
                return None;
            }
            let distance = if candidate.to_lowercase() == lowered {
                0
            } else {
                edit_distance(name, candidate)
            };
            (distance <= threshold).then_some((distance, order, candidate))
        })
        .collect();

    scored.sort_by_key(|&(distance, order, _)| (distance, order));
    scored.dedup_by_key(|&mut (_, _, candidate)| candidate);
    scored.into_iter().map(|(_, _, candidate)| candidate).collect()
}

/// The single closest candidate, if any is within the threshold.
pub fn suggest_similar<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    similar_names(name, candidates).into_iter().next()
}
