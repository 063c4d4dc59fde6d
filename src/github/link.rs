//! Parsing of `Link` response headers (RFC 8288).

/// What a `Link` header says about the page after the current one.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLink {
    /// The exact URL of the next page.
    Next(String),
    /// The header is well-formed but has no `next` relation, i.e. this is the last page.
    Last,
    /// The header could not be parsed.
    Malformed,
}

/// One `<uri>; rel="..."` entry of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// The target URL, without the angle brackets.
    pub url: String,
    /// Relation types, lowercased. A single `rel` may carry several, separated by spaces.
    pub rels: Vec<String>,
}

impl LinkEntry {
    /// Whether `rel` is one of the entry's relation types, ignoring case.
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Splits a `Link` header into its entries. Returns [`None`] if any entry is malformed.
pub fn parse_link_header(header: &str) -> Option<Vec<LinkEntry>> {
    let mut entries = Vec::new();
    let mut rest = header.trim();

    while !rest.is_empty() {
        let (url, after_url) = rest.strip_prefix('<')?.split_once('>')?;
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        // entries end at the first comma outside a quoted string
        let (params, tail) = split_unquoted(after_url, ',');
        entries.push(LinkEntry {
            url: String::from(url),
            rels: parse_rels(params),
        });

        rest = tail.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }

    Some(entries)
}

/// Classifies a `Link` header by its `next` relation.
pub fn next_link(header: &str) -> NextLink {
    match parse_link_header(header) {
        Some(entries) if !entries.is_empty() => entries
            .into_iter()
            .find(|entry| entry.has_rel("next"))
            .map_or(NextLink::Last, |entry| NextLink::Next(entry.url)),
        _ => NextLink::Malformed,
    }
}

/// Splits `s` at the first `sep` outside a quoted string.
fn split_unquoted(s: &str, sep: char) -> (&str, &str) {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            c if c == sep && !quoted => return (&s[..i], &s[i + c.len_utf8()..]),
            _ => {}
        }
    }
    (s, "")
}

fn parse_rels(mut params: &str) -> Vec<String> {
    let mut rels = Vec::new();
    while !params.is_empty() {
        let (param, rest) = split_unquoted(params, ';');
        params = rest;

        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("rel") {
            rels.extend(
                value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .map(str::to_ascii_lowercase),
            );
        }
    }
    rels
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_2: &str = "https://api.github.com/repositories/1296269/actions/runs?per_page=100&page=2";
    const PAGE_5: &str = "https://api.github.com/repositories/1296269/actions/runs?per_page=100&page=5";

    #[test]
    fn follows_next_among_several_relations() {
        let header = format!(r#"<{PAGE_2}>; rel="next", <{PAGE_5}>; rel="last""#);
        assert_eq!(next_link(&header), NextLink::Next(String::from(PAGE_2)));

        let header = format!(r#"<{PAGE_5}>; rel="last", <{PAGE_2}>; rel="next""#);
        assert_eq!(next_link(&header), NextLink::Next(String::from(PAGE_2)));
    }

    #[test]
    fn last_page_has_no_next() {
        let header = format!(r#"<{PAGE_2}>; rel="prev", <{PAGE_2}>; rel="first""#);
        assert_eq!(next_link(&header), NextLink::Last);
    }

    #[test]
    fn accepts_bare_and_multi_valued_rels() {
        assert_eq!(
            next_link(&format!("<{PAGE_2}>; rel=next")),
            NextLink::Next(String::from(PAGE_2))
        );
        assert_eq!(
            next_link(&format!(r#"<{PAGE_2}>;rel="last NEXT""#)),
            NextLink::Next(String::from(PAGE_2))
        );
    }

    #[test]
    fn keeps_commas_inside_urls_and_quotes() {
        let header = r#"<https://example.com/a?x=1,2>; title="a, b"; rel="next""#;
        let entries = parse_link_header(header).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/a?x=1,2");
        assert!(entries[0].has_rel("next"));
    }

    #[test]
    fn rel_inside_a_quoted_parameter_is_ignored() {
        let header = r#"<https://example.com/p2>; title="see;rel=next"; rel="prev""#;
        assert_eq!(next_link(header), NextLink::Last);

        let entries = parse_link_header(header).unwrap();
        assert_eq!(entries[0].rels, vec![String::from("prev")]);
    }

    #[test]
    fn malformed_headers_are_reported() {
        for header in ["", "   ", "garbage", "<https://example.com", "<>; rel=\"next\""] {
            assert_eq!(next_link(header), NextLink::Malformed, "{header:?}");
        }
    }
}
