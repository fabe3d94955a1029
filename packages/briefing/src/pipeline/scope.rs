//! Eligibility: is a question about the tracked organizations or their
//! industry at all?
//!
//! The allow-list is broad on purpose. Wrongly refusing an in-scope question
//! costs more than attempting an answer the model will hedge on.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::bounded;
use crate::text::contains_any_term;
use crate::traits::store::OrganizationDirectory;
use crate::types::organization::{resolve_name, Organization};

/// Industry vocabulary that puts a question in scope on its own.
pub const DOMAIN_TERMS: &[&str] = &[
    "defense",
    "defence",
    "aerospace",
    "military",
    "pentagon",
    "contract",
    "contracts",
    "contractor",
    "missile",
    "missiles",
    "aircraft",
    "satellite",
    "weapon",
    "weapons",
    "army",
    "navy",
    "air force",
    "marines",
    "hypersonic",
    "radar",
];

/// Questions about people and structure of an organization.
pub const ROLE_TERMS: &[&str] = &[
    "founder",
    "founded",
    "ceo",
    "cfo",
    "executive",
    "executives",
    "chairman",
    "president",
    "leadership",
    "board",
    "headquarters",
    "headquartered",
    "employees",
];

/// Topical gate shared by strategy selection and web augmentation.
pub struct Eligibility {
    roster: Arc<[Organization]>,
    directory: Arc<dyn OrganizationDirectory>,
    timeout: Duration,
}

impl Eligibility {
    pub fn new(
        roster: Arc<[Organization]>,
        directory: Arc<dyn OrganizationDirectory>,
        timeout: Duration,
    ) -> Self {
        Self {
            roster,
            directory,
            timeout,
        }
    }

    /// Keyword-only check of the question text.
    pub fn text_in_scope(&self, question: &str) -> bool {
        let lower = question.to_lowercase();
        contains_any_term(&lower, DOMAIN_TERMS)
            || contains_any_term(&lower, ROLE_TERMS)
            || self.roster.iter().any(|o| o.is_mentioned_in(&lower))
    }

    /// Whether the question, or any organization named for it, is in scope.
    ///
    /// Directory failures count as "not found".
    pub async fn is_in_scope(&self, question: &str, organizations: &[String]) -> bool {
        if self.text_in_scope(question) {
            return true;
        }

        for name in organizations {
            if resolve_name(&self.roster, name).is_some() {
                return true;
            }

            match bounded(
                self.timeout,
                "organization lookup",
                self.directory.get_by_name(name),
            )
            .await
            {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(e) => warn!(organization = %name, error = %e, "organization lookup failed"),
            }
        }

        debug!("question judged out of scope");
        false
    }
}
