// ABOUTME: Free-text descriptions attached to registered revisions and deployments.
// ABOUTME: Long descriptions are shortened around the middle to fit the service limit.

/// Longest description the deployment service accepts.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

pub const REGISTER_PREFIX: &str = "Application revision registered by ";
pub const DEPLOY_PREFIX: &str = "Deployment created by ";

const DEFAULT_SUBJECT: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
const ELLIPSIS: &str = "...";

/// Build `prefix + subject`, never exceeding `MAX_DESCRIPTION_LENGTH` characters.
///
/// The subject is the user's description, or the tool name when none is given.
pub fn describe(prefix: &str, description: Option<&str>) -> String {
    let subject = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_SUBJECT);
    let budget = MAX_DESCRIPTION_LENGTH.saturating_sub(prefix.chars().count());

    let described = format!("{prefix}{}", truncate_middle(subject, budget));
    if described.chars().count() > MAX_DESCRIPTION_LENGTH {
        described.chars().take(MAX_DESCRIPTION_LENGTH).collect()
    } else {
        described
    }
}

/// Replace a centered span with `...` so the result fits `max_len` characters.
pub fn truncate_middle(text: &str, max_len: usize) -> String {
    let len = text.chars().count();
    if len <= max_len {
        return text.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return text.chars().take(max_len).collect();
    }

    let keep = max_len - ELLIPSIS.len();
    let head = keep.div_ceil(2);
    let tail = keep - head;

    let mut shortened: String = text.chars().take(head).collect();
    shortened.push_str(ELLIPSIS);
    shortened.extend(text.chars().skip(len - tail));
    shortened
}
