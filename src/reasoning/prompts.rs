//! Prompt texts.

pub const SYSTEM_PROMPT: &str = "You are an expert AI assistant that explains your reasoning step by step.
For each step, provide a title that describes what you're doing in that step, along with the content.
Decide if you need another step or if you're ready to give the final answer.

TIPS FOR BETTER REASONING:
- Use as many reasoning steps as possible. At least 3.
- Be aware of your limitations as an LLM and what you can and cannot do.
- Include exploration of alternative answers. Consider you may be wrong.
- When you say you are re-examining, actually re-examine using another approach.
- Use at least 3 methods to derive the answer.
- Use best practices.

Your response should be structured as a series of reasoning steps, followed by a final answer.
Provide your response in JSON format with reasoning_steps and final_answer fields.";

const REASONING_PROMPT_TEMPLATE: &str = "Please solve the following problem using step-by-step reasoning:

{query}

Break down your thinking process and consider multiple approaches before arriving at your final answer.
Return your response in JSON format with reasoning steps and a final answer.";

/// Appended to the user message in schema mode when no message mentions JSON.
pub const JSON_REMINDER: &str = " Please format your response as JSON.";

/// Appended to the system message in tools mode, where no schema can be sent.
pub const JSON_SHAPE_INSTRUCTIONS: &str = "\n\nPlease format your response as a JSON object with the following structure:\n{
  \"reasoning_steps\": [
    {\"title\": \"Step Title\", \"content\": \"Step content\", \"next_action\": \"continue or final_answer\"},
    ...
  ],
  \"final_answer\": \"Your final answer here\"
}";

/// User turn added after tool results when structured output is wanted.
pub const POST_TOOL_REMINDER: &str = "Now that you have the calculation result, please provide your final answer. Remember to format your response as JSON with reasoning_steps and final_answer.";

pub const FALLBACK_SYSTEM_PROMPT: &str = "You are an expert AI assistant that explains your reasoning step by step. Break down complex problems into steps and show your work clearly.";

pub fn reasoning_prompt(query: &str) -> String {
    REASONING_PROMPT_TEMPLATE.replace("{query}", query)
}

pub fn fallback_prompt(query: &str) -> String {
    format!(
        "Please solve the following problem using step-by-step reasoning. Show your work and explain each step of your thinking process:\n\n{}",
        query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_prompt_embeds_query_once() {
        let prompt = reasoning_prompt("What is {query}?");
        assert!(prompt.contains("\n\nWhat is {query}?\n\n"));
        assert!(prompt.starts_with("Please solve the following problem"));
    }

    #[test]
    fn test_fallback_prompt_ends_with_query() {
        assert!(fallback_prompt("2+2").ends_with(":\n\n2+2"));
        assert!(!FALLBACK_SYSTEM_PROMPT.to_lowercase().contains("json"));
    }

    #[test]
    fn test_json_shape_instructions_parse_after_elision() {
        let example = JSON_SHAPE_INSTRUCTIONS
            .split_once('{')
            .map(|(_, rest)| format!("{{{}", rest.replace(",\n    ...", "")))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&example).unwrap();
        assert!(value.get("final_answer").is_some());
    }
}
