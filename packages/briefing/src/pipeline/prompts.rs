//! LLM prompts for analysis, synthesis and summarisation.

use crate::types::article::Article;
use crate::types::evidence::{EvidenceItem, EvidenceOrigin};
use crate::types::organization::Organization;

/// System prompt for structured question analysis.
pub const ANALYSIS_PROMPT: &str = r#"You analyze questions for a defense and aerospace industry news service.

Tracked organizations: {roster}

From the user's question, extract:
1. query_type: one of financial, contracts, general, comparison, news
2. company_names: tracked organizations the question is about (use the names above)
3. keywords: the important words of the question
4. time_window: recent, this_month, this_quarter, this_year, or null if none is implied
5. search_terms: short phrases that would find relevant articles

Respond with a single JSON object:
{
    "query_type": "financial",
    "company_names": ["Raytheon Technologies"],
    "keywords": ["revenue", "quarter"],
    "time_window": "this_quarter",
    "search_terms": ["RTX quarterly revenue"]
}"#;

/// System prompt for evidence-backed answers. `{context}` is replaced with
/// the formatted evidence block.
pub const SYNTHESIS_PROMPT: &str = r#"You are an analyst covering defense and aerospace industry news.
Answer the user's question using ONLY the context below.

Guidelines:
- Cite concrete facts from the context: dates, figures, contract values, source titles
- If the context does not contain enough information, say so plainly
- Do not invent anything that is not in the context
- Be concise: two or three short paragraphs at most
- Local news articles are curated; treat web results as less certain

{context}"#;

/// System prompt for answers with no retrieved evidence.
pub const DIRECT_KNOWLEDGE_PROMPT: &str = r#"You are an analyst covering defense and aerospace industry organizations.
No recent articles were found for this question. Answer briefly from your own background knowledge.
State clearly that the information may not be current and should be verified against recent sources."#;

/// System prompt for article digests.
pub const SUMMARIZE_PROMPT: &str = r#"Summarize this news article in three to five factual sentences.
Keep names, dates, figures and contract values exactly as written. Do not add opinion or outside information."#;

/// Fill the analysis prompt with the tracked roster.
pub fn format_analysis_prompt(roster: &[Organization]) -> String {
    let names = roster
        .iter()
        .map(|o| match &o.ticker {
            Some(ticker) => format!("{} ({})", o.name, ticker),
            None => o.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    ANALYSIS_PROMPT.replace("{roster}", &names)
}

/// Fill the synthesis prompt with an evidence context block.
pub fn format_synthesis_prompt(evidence: &[EvidenceItem]) -> String {
    SYNTHESIS_PROMPT.replace("{context}", &build_context(evidence))
}

/// Render evidence grouped by origin, local articles first.
pub fn build_context(evidence: &[EvidenceItem]) -> String {
    let mut context = String::new();

    let local: Vec<_> = evidence.iter().filter(|e| e.is_local()).collect();
    let web: Vec<_> = evidence.iter().filter(|e| e.is_web()).collect();

    if !local.is_empty() {
        context.push_str("## Local news articles\n");
        for (i, item) in local.iter().enumerate() {
            context.push_str(&format!("\n--- Article {} ---\n", i + 1));
            if let EvidenceOrigin::Local { organization, .. } = &item.origin {
                context.push_str(&format!("Organization: {}\n", organization));
            }
            push_common(&mut context, item);
        }
    }

    if !web.is_empty() {
        if !context.is_empty() {
            context.push('\n');
        }
        context.push_str("## Web search results\n");
        for (i, item) in web.iter().enumerate() {
            context.push_str(&format!("\n--- Result {} ---\n", i + 1));
            if let EvidenceOrigin::Web { source } = &item.origin {
                context.push_str(&format!("Source: {}\n", source));
            }
            push_common(&mut context, item);
        }
    }

    context
}

fn push_common(context: &mut String, item: &EvidenceItem) {
    context.push_str(&format!("Title: {}\n", item.title));
    if let Some(date) = item.published_at {
        context.push_str(&format!("Date: {}\n", date.format("%Y-%m-%d")));
    }
    context.push_str(&format!("Summary: {}\n", item.summary));
    context.push_str(&format!("URL: {}\n", item.url));
}

/// User message for an article digest.
pub fn format_summarize_input(article: &Article) -> String {
    let mut input = format!("Title: {}\n", article.title);
    input.push_str(&format!(
        "Published: {}\n",
        article.published_at.format("%Y-%m-%d")
    ));
    if !article.summary.is_empty() {
        input.push_str(&format!("Summary: {}\n", article.summary));
    }
    if let Some(content) = article.content.as_deref().filter(|c| !c.is_empty()) {
        input.push_str(&format!("\nContent:\n{}\n", content));
    }
    input
}
