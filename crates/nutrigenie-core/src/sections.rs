use serde::{Deserialize, Serialize};
use tracing::debug;

/// One labeled slice of a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

/// Outcome of post-processing a raw response. There is no structured output
/// contract with the generation service, so sectioning can always fail; the
/// fallback keeps the raw text visible instead of raising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionedResponse {
    Sections { sections: Vec<Section> },
    Unsectioned { text: String },
}

/// Split on `[[Title]]` marker lines the prompt asked the model to emit.
/// Returns `None` when no marker is present.
pub fn parse_tagged(text: &str) -> Option<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(title) = trimmed
            .strip_prefix("[[")
            .and_then(|rest| rest.strip_suffix("]]"))
            && !title.trim().is_empty()
        {
            if let Some((title, body)) = current.take() {
                sections.push(Section {
                    title,
                    body: body.join("\n").trim().to_string(),
                });
            }
            current = Some((title.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
        // Chatter before the first marker is dropped.
    }

    if let Some((title, body)) = current.take() {
        sections.push(Section {
            title,
            body: body.join("\n").trim().to_string(),
        });
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections)
    }
}

/// Slice `text` on the literal header substrings `titles[1..]`, located in
/// order; `titles[0]` labels the leading slice. Each body is the raw slice
/// (headers included), so concatenating the bodies reconstructs the input
/// exactly. Returns `None` when any header is absent or out of order.
pub fn split_literal(text: &str, titles: &[&str]) -> Option<Vec<Section>> {
    if titles.is_empty() || text.is_empty() {
        return None;
    }

    let mut boundaries = Vec::with_capacity(titles.len());
    boundaries.push(0usize);

    let mut search_from = 0usize;
    for title in &titles[1..] {
        let found = text.get(search_from..)?.find(title)?;
        let pos = search_from + found;
        boundaries.push(pos);
        search_from = pos + title.len();
    }

    let mut sections = Vec::with_capacity(titles.len());
    for (i, title) in titles.iter().enumerate() {
        let start = boundaries[i];
        let end = boundaries.get(i + 1).copied().unwrap_or(text.len());
        sections.push(Section {
            title: (*title).to_string(),
            body: text[start..end].to_string(),
        });
    }

    Some(sections)
}

/// Post-process a raw response into labeled sections. Tagged markers win;
/// literal header matching is the documented fallback; failing both, the
/// whole text is returned as-is.
pub fn sectioned_response(text: &str, titles: &[&str]) -> SectionedResponse {
    if let Some(sections) = parse_tagged(text) {
        return SectionedResponse::Sections { sections };
    }

    if let Some(sections) = split_literal(text, titles) {
        return SectionedResponse::Sections { sections };
    }

    debug!("response did not match expected section structure, passing through raw text");
    SectionedResponse::Unsectioned {
        text: text.to_string(),
    }
}
