use memchr::memmem::Finder;

/// Reports whether at least one term occurs in `content` as a literal byte
/// substring. Matching is case-sensitive and an empty term list never matches.
pub fn content_matches(content: &[u8], terms: &[String]) -> bool {
    terms
        .iter()
        .any(|term| memchr::memmem::find(content, term.as_bytes()).is_some())
}

/// Same contract as [`content_matches`], applied to a file name
pub fn name_matches(name: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| name.contains(term.as_str()))
}

/// Precompiled form of a term list, built once per search and shared by all
/// workers.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    terms: Vec<String>,
    finders: Vec<Finder<'static>>,
}

impl TermMatcher {
    /// Creates a new TermMatcher for the given terms
    pub fn new(terms: Vec<String>) -> Self {
        let finders = terms
            .iter()
            .map(|term| Finder::new(term.as_bytes()).into_owned())
            .collect();
        Self { terms, finders }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Checks file content against every term
    pub fn matches_content(&self, content: &[u8]) -> bool {
        self.finders
            .iter()
            .any(|finder| finder.find(content).is_some())
    }

    /// Checks a file name against every term
    pub fn matches_name(&self, name: &str) -> bool {
        name_matches(name, &self.terms)
    }
}
