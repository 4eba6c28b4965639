//! Line-oriented fenced block scanner.
//!
//! Splits a reply into its ```` ``` ```` fenced blocks. YAML blocks never
//! nest, so the first bare fence closes them. Markdown blocks may contain
//! their own fenced code (contracts, tests, commands); inside those, a fence
//! with an info string opens an inner block and a bare fence closes it. A
//! bare fence outside any inner block closes the markdown block when the
//! body already has its `## Done When` checklist or when the next fence in
//! the reply is not a bare one.
//!
//! An unclosed fence runs to the end of the reply.

/// A fenced block found in a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Lowercased first word of the info string (`yaml`, `markdown`, or empty)
    pub lang: String,
    pub body: String,
    pub closed: bool,
}

impl FencedBlock {
    /// YAML blocks, including fences without a language tag.
    pub fn is_yaml(&self) -> bool {
        matches!(self.lang.as_str(), "yaml" | "yml" | "")
    }

    pub fn is_markdown(&self) -> bool {
        is_markdown_lang(&self.lang)
    }

    /// Whether every key in `keys` appears as a top-level mapping key.
    pub fn has_top_level_keys(&self, keys: &[&str]) -> bool {
        let found = top_level_keys(&self.body);
        keys.iter().all(|k| found.contains(k))
    }
}

fn is_markdown_lang(lang: &str) -> bool {
    matches!(lang, "markdown" | "md")
}

/// If `line` is a fence, return its info string (possibly empty).
pub(crate) fn fence_info(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let ticks = trimmed.chars().take_while(|&c| c == '`').count();
    if ticks < 3 {
        return None;
    }
    let info = trimmed[ticks..].trim();
    // ```` ```foo``` ```` on one line is inline code, not a fence
    if info.contains('`') {
        return None;
    }
    Some(info)
}

fn is_bare_fence(line: &str) -> bool {
    fence_info(line).is_some_and(str::is_empty)
}

/// Find every fenced block in `text`, in order.
pub fn fenced_blocks(text: &str) -> Vec<FencedBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(info) = fence_info(lines[i]) else {
            i += 1;
            continue;
        };
        let lang = info
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let markdown = is_markdown_lang(&lang);

        let mut body = String::new();
        let mut inner = false;
        let mut closed = false;
        i += 1;

        while i < lines.len() {
            let line = lines[i];
            i += 1;

            match fence_info(line) {
                Some(_) if markdown && inner => inner = false,
                Some(info) if markdown && !info.is_empty() => inner = true,
                Some("") if markdown => {
                    if closes_markdown(&body, &lines[i..]) {
                        closed = true;
                        break;
                    }
                    inner = true;
                }
                Some("") => {
                    closed = true;
                    break;
                }
                _ => {}
            }

            body.push_str(line);
            body.push('\n');
        }

        blocks.push(FencedBlock { lang, body, closed });
    }

    blocks
}

/// Decide whether a bare fence ends a markdown block. `rest` is every line
/// after the fence.
fn closes_markdown(body: &str, rest: &[&str]) -> bool {
    if body.lines().any(|l| l.trim_start().starts_with("## Done When")) {
        return true;
    }
    match rest.iter().find(|l| fence_info(l).is_some()) {
        Some(next) => !is_bare_fence(next),
        None => true,
    }
}

/// Top-level mapping keys of a YAML body, found line by line.
pub fn top_level_keys(body: &str) -> Vec<&str> {
    body.lines()
        .filter(|line| !line.starts_with([' ', '\t', '#', '-']))
        .filter_map(|line| {
            let (key, _) = line.split_once(':')?;
            let key = key.trim_end();
            let valid = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            valid.then_some(key)
        })
        .collect()
}
