const MAX_NAME_LEN: usize = 150;

/// Safe local name for an artifact the runner serves as `server_name`.
///
/// Keeps only the last path component, replaces characters Windows forbids
/// and patches reserved device names. Returns `None` when nothing usable is left.
pub fn local_artifact_name(server_name: &str) -> Option<String> {
    let base = server_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(server_name);
    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&[' ', '.'][..]);
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }

    let (stem, ext) = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (cleaned, None),
    };
    let mut stem = truncate_on_boundary(stem, MAX_NAME_LEN).to_string();
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    Some(match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    })
}

fn truncate_on_boundary(input: &str, max: usize) -> &str {
    if input.len() <= max {
        return input;
    }
    let mut end = max;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    &input[..end]
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
