//! Prompts for plain-language article summaries.

pub const SYSTEM_PROMPT: &str = "You are an expert AI science communicator. Your task is to summarize the provided AI-related news article \
for a general audience with no prior technical AI knowledge (e.g., curious high school students, \
educated adults from non-technical fields). The summary must be accurate, easy to understand, engaging, \
and objective. It is crucial to avoid overgeneralization and hype.";

const GUIDELINES: &str = r#"When generating the summary, please adhere STRICTLY to the following guidelines:
1.  **Accuracy and Faithfulness:** The summary MUST be factually accurate and faithfully represent the core findings, significance, and any explicitly stated limitations or caveats from the original article. Do NOT add external information or your own opinions.
2.  **Target Audience & Clarity:** Write in clear, simple, and concise language. Avoid jargon. If a technical term is absolutely essential, explain it briefly in a very simple way or use an analogy. The goal is to make complex AI topics accessible.
3.  **Content Focus:**
    * Identify the main problem or question the article addresses.
    * Briefly explain the core AI technology or method used in simple terms.
    * Highlight the key results or developments.
    * Clearly state the significance or potential impact of these developments for a general reader.
4.  **Avoid Overgeneralization and Hype:** Do NOT exaggerate claims or make predictions beyond what the article supports. If the research is preliminary or has limitations, this MUST be subtly reflected in the summary (e.g., "researchers suggest this could potentially lead to...", "while promising, more research is needed to confirm...").
5.  **Structure & Length:**
    * Start with a one-sentence key takeaway or the most interesting finding.
    * Follow with 2-4 short paragraphs (or 3-5 bullet points if more appropriate for the content) explaining the main points.
    * Aim for a total summary length of approximately 150-250 words.
6.  **Tone:** Objective, neutral, yet engaging and informative.

Output ONLY the popular science summary. Do not include any preambles or conversational text beyond the summary itself.
"#;

/// Builds the user message embedding the article title and content.
pub fn user_prompt(title: &str, content: &str) -> String {
    format!(
        "Please create a popular science summary for the following article:\n\n\
         Article Title: \"{}\"\n\n\
         Article Content:\n---\n{}\n---\n\n{}",
        title, content, GUIDELINES
    )
}
