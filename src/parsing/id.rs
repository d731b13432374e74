//! Identifier extraction from header lines.

use regex::Regex;

use crate::config::DEFAULT_ID_REGEXP;

/// Extracts the record identifier from a full header line
#[derive(Debug, Clone)]
pub struct IdParser {
    /// `None` for the default pattern, which is matched without a regex
    regex: Option<Regex>,
}

impl IdParser {
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        if pattern == DEFAULT_ID_REGEXP {
            return Ok(Self { regex: None });
        }
        Ok(Self {
            regex: Some(Regex::new(pattern)?),
        })
    }

    /// Identifier of `header`; the whole header if the pattern does not match
    #[must_use]
    pub fn parse<'a>(&self, header: &'a str) -> &'a str {
        match &self.regex {
            None => header.split_whitespace().next().unwrap_or(header),
            Some(regex) => regex
                .captures(header)
                .and_then(|caps| caps.get(1))
                .map_or(header, |m| m.as_str()),
        }
    }
}

impl Default for IdParser {
    fn default() -> Self {
        Self { regex: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NCBI_ID_REGEXP;

    #[test]
    fn test_default_pattern() {
        let parser = IdParser::new(DEFAULT_ID_REGEXP).unwrap();
        assert_eq!(parser.parse("chr1 Homo sapiens"), "chr1");
        assert_eq!(parser.parse("chr2"), "chr2");
    }

    #[test]
    fn test_ncbi_pattern() {
        let parser = IdParser::new(NCBI_ID_REGEXP).unwrap();
        assert_eq!(
            parser.parse("gi|110645304|ref|NC_002516.2| Pseudomonas aeruginosa"),
            "NC_002516.2"
        );
        // No match falls back to the full header
        assert_eq!(parser.parse("plain header"), "plain header");
    }

    #[test]
    fn test_custom_pattern() {
        let parser = IdParser::new(r"^(\w+)\.\d+").unwrap();
        assert_eq!(parser.parse("NM_0001.2 transcript"), "NM_0001");
        assert!(IdParser::new("(").is_err());
    }
}
