//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile `{param}` templates into literal / parameter segments
//! - Match request paths segment by segment, capturing parameters
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A parameter captures exactly one non-empty segment
//! - A single trailing slash on the request path is ignored
//! - No regex to guarantee O(n) matching

/// One compiled segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

/// Parameters captured from the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(&'static str, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A compiled route pattern such as `/api/mehms/{id}/like`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: &'static str,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn compile(source: &'static str) -> Self {
        let segments = split(source)
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => Segment::Param(name),
                    None => Segment::Literal(segment),
                }
            })
            .collect();

        Self { source, segments }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Match `path`, returning captured parameters on success.
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        let mut params = Vec::new();
        let mut parts = split(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if *literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.push((*name, part.to_string())),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(PathParams(params))
    }
}

fn split<'a>(path: &'a str) -> impl Iterator<Item = &'a str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').filter(|s| !s.is_empty())
}
