//! Prompt templates sent to the content generator. Placeholders are written
//! as `{{NAME}}` and filled with [`fill_template`].

pub const NO_PREVIOUS_DATA: &str = "no previous data";

pub const DIFFICULTY_SELECTION_PROMPT: &str = "You are an adaptive learning assistant deciding the difficulty of the next quiz for a student.

## PREVIOUS QUIZ

- Score: {{PREVIOUS_SCORE}}
- Reported emotion: {{PREVIOUS_EMOTION}}
- Difficulty: {{PREVIOUS_DIFFICULTY}}

## GUIDANCE

- A high score together with a positive emotion (happy, excited, surprise) means the student is ready for a harder quiz.
- A low score together with a negative emotion (sad, angry, confused) means the next quiz should be easier.
- Mixed or neutral signals mean the difficulty should stay the same.
- When there is no previous data, choose medium.

## OUTPUT INSTRUCTIONS

Answer with exactly one word: easy, medium or hard.
Do not add punctuation, explanations or any other text.";

pub const QUIZ_GENERATION_PROMPT: &str = r#"You are an educational quiz generator.

Generate exactly 5 multiple-choice questions about "{{TOPIC}}" in the context of "{{SUBJECT}}" at {{DIFFICULTY}} difficulty.

## QUESTION REQUIREMENTS

- Each question has exactly 4 options.
- Options within a question are distinct and non-empty.
- Exactly one option is correct and correctAnswer repeats its text verbatim.
- Never use "All of the above" or "None of the above" as an option.
- Questions cover different aspects of the topic.

## OUTPUT FORMAT

Return a JSON array of 5 objects. Each object must conform to this JSON schema:

{{QUESTION_SCHEMA}}

## OUTPUT INSTRUCTIONS

Return ONLY the JSON array. Do not include:
- Explanatory text before or after the JSON
- Markdown code blocks or formatting
- Any commentary or additional content"#;

pub const CONTENT_GENERATION_PROMPT: &str = r#"Generate comprehensive educational content about "{{TOPIC}}" in the context of "{{SUBJECT}}".

Please structure the content in the following format using proper markdown:

# {{TOPIC}}

## Overview
[Provide a brief introduction and overview of the topic]

## Key Concepts
[List and explain the main concepts with clear definitions]

## Detailed Explanation
[Provide detailed explanations with examples]

## Examples
[Include practical examples with code snippets if applicable]

## Best Practices
[List important best practices and tips]

## Common Mistakes
[Highlight common mistakes and how to avoid them]

## Summary
[Provide a concise summary of the key points]

Please ensure:
1. Use proper markdown formatting for headings, lists, and code blocks
2. Include relevant examples and code snippets where appropriate
3. Make the content engaging and easy to understand
4. Use bullet points and numbered lists for better readability
5. Include practical applications and real-world examples"#;

pub const PERSONALIZED_CONTENT_PROMPT: &str = r#"A student is struggling with "{{TOPIC}}" in the context of "{{SUBJECT}}".

## STUDENT CONTEXT

- Current emotion: {{EMOTION}}
- Quizzes taken in a row on this topic: {{ATTEMPTS}}
- Recent quiz results (oldest first):
{{HISTORY}}

## TASK

Write simplified learning material in markdown that helps this student recover.

- Start with a short encouraging note that fits the student's emotion.
- Explain the core ideas again in plain language with small, concrete steps.
- Use analogies and short examples instead of dense definitions.
- Point out the misconceptions that usually cause low quiz scores on this topic.
- End with three short self-check questions and their answers.

Keep the tone supportive and avoid jargon unless it is explained."#;

pub const PITFALLS_HEADING: &str = "## Common Pitfalls";
pub const MISTAKES_HEADING: &str = "## Common Mistakes";

/// Replaces every `{{KEY}}` in `template` with its value.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{{{}}}}}", key), value)
        })
}
