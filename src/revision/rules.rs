// ABOUTME: Path mapping rule grammar for revision packaging.
// ABOUTME: Parses "SOURCE" and "SOURCE=>DEST" items separated by commas or newlines.

/// Fixed name of the deployment spec file inside a revision archive.
pub const SPEC_FILE_NAME: &str = "appspec.yml";

const WILDCARDS: [char; 2] = ['*', '?'];

/// Whether a rule adds files to the revision or removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Include,
    Exclude,
}

/// A single `SOURCE=>DEST` rule with normalized paths.
///
/// The pattern keeps a trailing `/` when the user wrote one, since that marks a
/// directory rule. An empty destination means the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    kind: RuleKind,
    pattern: String,
    destination: String,
}

impl MappingRule {
    pub fn new(pattern: &str, destination: &str) -> Self {
        Self::with_kind(RuleKind::Include, pattern, destination)
    }

    pub fn with_kind(kind: RuleKind, pattern: &str, destination: &str) -> Self {
        let destination = normalize_path(destination);
        Self {
            kind,
            pattern: normalize_path(pattern),
            destination: destination.trim_matches('/').to_string(),
        }
    }

    /// Parse one rule item. Returns `None` for blank items.
    pub fn parse(item: &str) -> Option<Self> {
        let item = item.trim();
        if item.is_empty() {
            return None;
        }

        let (source, destination) = match item.split_once("=>") {
            Some((source, destination)) => (source.trim(), destination.trim()),
            None => (item, ""),
        };

        let (kind, source) = if let Some(rest) = source.strip_prefix("-:") {
            (RuleKind::Exclude, rest.trim())
        } else if let Some(rest) = source.strip_prefix("+:") {
            (RuleKind::Include, rest.trim())
        } else {
            (RuleKind::Include, source)
        };

        if source.is_empty() {
            return None;
        }

        Some(Self::with_kind(kind, source, destination))
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_exclude(&self) -> bool {
        self.kind == RuleKind::Exclude
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn has_wildcard(&self) -> bool {
        self.pattern.contains(WILDCARDS)
    }

    /// Glob source for this rule; a trailing `/` selects everything below it.
    pub(crate) fn glob_pattern(&self) -> String {
        if self.pattern.ends_with('/') {
            format!("{}**", self.pattern)
        } else {
            self.pattern.clone()
        }
    }
}

/// Rules in the order the user declared them. Order matters for mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<MappingRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    pub fn parse(text: &str) -> Self {
        let rules = text
            .split([',', '\n', '\r'])
            .filter_map(MappingRule::parse)
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn includes(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules.iter().filter(|r| !r.is_exclude())
    }

    pub fn excludes(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules.iter().filter(|r| r.is_exclude())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// The single literal path named by this rule set, if that is all it holds.
    ///
    /// Used to recognise a pre-built archive: exactly one include rule, no
    /// wildcard, and no destination.
    pub fn single_path(&self) -> Option<&str> {
        match self.rules.as_slice() {
            [rule]
                if !rule.is_exclude() && !rule.has_wildcard() && rule.destination.is_empty() =>
            {
                Some(rule.pattern())
            }
            _ => None,
        }
    }
}

/// Normalize separators and collapse `.` and `..` segments.
///
/// A leading `/` (absolute path) and a trailing `/` (directory) survive.
/// `..` segments that would climb above the start are kept as-is.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let absolute = path.starts_with('/');
    let directory = path.len() > 1 && path.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if directory && !segments.is_empty() {
        normalized.push('/');
    }
    normalized
}
