//! Tracked organizations and the roster used for alias resolution.

use serde::{Deserialize, Serialize};

use crate::text::contains_term;

/// Industry an organization is tracked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    Defense,
    Aerospace,
    Government,
}

/// A tracked organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Canonical name, as stored on articles
    pub name: String,

    /// Exchange ticker, if listed
    #[serde(default)]
    pub ticker: Option<String>,

    /// Lowercase name variants that identify this organization in free text
    #[serde(default)]
    pub aliases: Vec<String>,

    pub industry: Industry,

    #[serde(default)]
    pub website: Option<String>,
}

impl Organization {
    /// Create an organization with no aliases.
    pub fn new(name: impl Into<String>, industry: Industry) -> Self {
        Self {
            name: name.into(),
            ticker: None,
            aliases: Vec::new(),
            industry,
            website: None,
        }
    }

    /// Set the ticker.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Add aliases.
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.aliases
            .extend(aliases.into_iter().map(|a| a.into().to_lowercase()));
        self
    }

    /// Set the website.
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Every lowercase variant of this organization's name.
    pub fn name_variants(&self) -> Vec<String> {
        let mut variants = vec![self.name.to_lowercase()];
        if let Some(ticker) = &self.ticker {
            variants.push(ticker.to_lowercase());
        }
        for alias in &self.aliases {
            let alias = alias.to_lowercase();
            if !variants.contains(&alias) {
                variants.push(alias);
            }
        }
        variants
    }

    /// Whether `name` refers to this organization (exact variant match).
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        !name.is_empty() && self.name_variants().iter().any(|v| *v == name)
    }

    /// Whether lowercase free text mentions this organization.
    pub fn is_mentioned_in(&self, text_lower: &str) -> bool {
        self.name_variants()
            .iter()
            .any(|v| contains_term(text_lower, v))
    }

    /// The organizations tracked out of the box.
    pub fn default_roster() -> Vec<Organization> {
        vec![
            Organization::new("Raytheon Technologies", Industry::Defense)
                .with_ticker("RTX")
                .with_aliases(["rtx", "raytheon", "rtx corporation", "rtx corp"])
                .with_website("https://www.rtx.com"),
            Organization::new("US War Department", Industry::Government)
                .with_aliases([
                    "war department",
                    "us war department",
                    "war dept",
                    "department of war",
                    "department of defense",
                    "pentagon",
                ])
                .with_website("https://www.war.gov"),
            Organization::new("Lockheed Martin", Industry::Aerospace)
                .with_ticker("LMT")
                .with_aliases(["lockheed", "lockheed martin"])
                .with_website("https://www.lockheedmartin.com"),
        ]
    }
}

/// Resolve a free-form organization name against a roster.
///
/// Returns the canonical name, or `None` if nothing on the roster matches.
pub fn resolve_name<'a>(roster: &'a [Organization], name: &str) -> Option<&'a str> {
    roster
        .iter()
        .find(|o| o.is_named(name))
        .map(|o| o.name.as_str())
}

/// Canonical names of all roster organizations mentioned in free text,
/// in roster order.
pub fn mentioned_in<'a>(roster: &'a [Organization], text: &str) -> Vec<&'a str> {
    let lower = text.to_lowercase();
    roster
        .iter()
        .filter(|o| o.is_mentioned_in(&lower))
        .map(|o| o.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_alias_to_canonical() {
        let roster = Organization::default_roster();
        assert_eq!(resolve_name(&roster, "RTX"), Some("Raytheon Technologies"));
        assert_eq!(resolve_name(&roster, " lockheed "), Some("Lockheed Martin"));
        assert_eq!(resolve_name(&roster, "Boeing"), None);
        assert_eq!(resolve_name(&roster, ""), None);
    }

    #[test]
    fn test_mentioned_in_free_text() {
        let roster = Organization::default_roster();
        let found = mentioned_in(&roster, "Compare Raytheon with Lockheed this year");
        assert_eq!(found, vec!["Raytheon Technologies", "Lockheed Martin"]);

        assert!(mentioned_in(&roster, "Best pizza recipes").is_empty());
    }

    #[test]
    fn test_roster_deserializes_with_defaults() {
        let json = r#"[{"name": "Northrop Grumman", "industry": "Defense"}]"#;
        let roster: Vec<Organization> = serde_json::from_str(json).unwrap();
        assert_eq!(roster[0].name, "Northrop Grumman");
        assert!(roster[0].aliases.is_empty());
        assert!(roster[0].is_named("northrop grumman"));
    }
}
