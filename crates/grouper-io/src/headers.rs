use std::collections::HashSet;

/// Turn a raw header row into unique column names.
///
/// Blank headers become `Unnamed: {index}`; repeated names get `.1`, `.2`, ... suffixes, skipping
/// any suffix that is already taken by another header.
pub(crate) fn normalize_headers(raw: Vec<Option<String>>) -> Vec<String> {
    let originals: HashSet<String> = raw.iter().flatten().cloned().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut out = Vec::with_capacity(raw.len());

    for (idx, name) in raw.into_iter().enumerate() {
        let base = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => {
                let generated = format!("Unnamed: {idx}");
                log::warn!("column {idx} has no header; naming it `{generated}`");
                generated
            }
        };

        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while taken.contains(&candidate) || (candidate != base && originals.contains(&candidate)) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        if candidate != base {
            log::warn!("duplicate header `{base}` at column {idx}; renaming it `{candidate}`");
        }

        taken.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
