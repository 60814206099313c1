//! Audit prompt construction.
//!
//! The contract the prompt imposes on the model: every violation must
//! cite a rule literally present in the guideline text (by reference
//! id), not one inferred by analogy. This is a generation-time contract
//! enforced by instruction, not independently machine-verified.

use chrono::Utc;

use redline_core::models::{Candidate, Violation};

const AUDIT_SYSTEM: &str = r#"You are an expert copy editor with agentic capabilities.
Today's date is {current_date}. Accept any events described in the text as factual, including those after your training cutoff.

Review the entire paragraph below and flag every rule violation you can find.

CRITICAL INSTRUCTIONS:
1. TEMPORAL GROUNDING:
   - Accept the paragraph's timeline as factual.
   - Do NOT flag dates or appointments as errors unless they violate a STYLE rule.
   - Your role is STYLE, not FACT-CHECKING.

2. Apply rules LITERALLY based on the guideline text, not rule interpretations.
   - Read the full guideline text carefully.
   - Only flag violations that explicitly match the guideline.
   - If the text already matches the guideline requirement, DO NOT flag it.

   EXAMPLE: If a rule says "Use 'Alberta Government' (capitalized)" and the text says "Alberta Government", this is CORRECT - do NOT flag it.
   EXAMPLE: If a rule says "Use 'oilsands'" and the text says "tarsands", this IS a violation.

3. Do NOT over-generalize or extrapolate.
   - Rules about specific terms apply only to those exact terms.
   - Do NOT invent additional cases.

4. Verify each violation:
   - Is the text in the paragraph exactly what the guideline says to change?
   - Would fixing it actually improve compliance with the rule?
   - If the text is already correct per the guideline, skip it.

5. Avoid reporting duplicates.

6. Confidence:
   - Set "confident": true only if you have reviewed all rules and are certain.
   - Set "confident": false if unsure or the retrieved rules seem incomplete.

7. Context:
   - If you need more rules, set "needs_more_context": true and provide "additional_queries".
   - Make queries SPECIFIC and SHORT (e.g. "em dash usage", "premier capitalization")."#;

/// Build the full audit prompt for one iteration.
///
/// Candidates are tagged with their stable reference id; for iterations
/// after the first, a reflection block lists already-flagged spans so
/// the model does not re-flag them.
pub fn audit_prompt(
    paragraph: &str,
    candidates: &[Candidate],
    prior_violations: &[Violation],
    iteration: usize,
    include_thinking: bool,
) -> String {
    let current_date = Utc::now().format("%B %d, %Y").to_string();
    let mut prompt = AUDIT_SYSTEM.replace("{current_date}", &current_date);

    if include_thinking {
        prompt.push_str(
            "\nExplain your reasoning in the 'thinking' field before listing violations.",
        );
    }

    prompt.push_str("\n\nUSER PARAGRAPH:\n\"");
    prompt.push_str(paragraph);
    prompt.push_str("\"\n\n--- RETRIEVED RULES (reference by rule_id) ---\n");
    prompt.push_str(&context_block(candidates));

    if iteration > 0 && !prior_violations.is_empty() {
        prompt.push('\n');
        prompt.push_str(&reflection_block(prior_violations, iteration));
    }

    prompt
}

fn context_block(candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return "No rules found.".to_string();
    }
    candidates
        .iter()
        .map(|c| {
            let url = if c.url.is_empty() { "Unknown" } else { &c.url };
            format!(
                "{} | Rule: {}\nURL: {}\nGuideline: {}",
                c.id, c.term, url, c.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn reflection_block(violations: &[Violation], iteration: usize) -> String {
    let summary = violations
        .iter()
        .take(5)
        .map(|v| format!("- \"{}\": {}", v.text, v.explanation))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "--- PREVIOUS ANALYSIS (iteration {iteration}) ---\n\
         You previously flagged these spans:\n{summary}\n\
         Do not re-flag them. Review for anything missed, and decide whether you need more context."
    )
}
