use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::domain::stage::IMPLEMENT_STAGE;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(stage|count|language|problem_statement|solution_content)\}")
        .expect("PLACEHOLDER_REGEX is a valid regex pattern")
});

pub const QUESTION_GENERATOR_SYSTEM_PROMPT: &str = "You are an expert software engineering interviewer who writes multiple-choice questions for candidates practising the UMPIRE method (Understand, Match, Plan, Implement, Review, Evaluate). You always answer with a single valid JSON object and nothing else.";

pub const IMPLEMENT_STAGE_TEMPLATE: &str = r#"Given the following problem statement and {language} implementation, generate {count} multiple-choice questions that test the interviewee's in-depth understanding of the implementation for this problem.

## QUESTION REQUIREMENTS

1. Focus on specific code snippets or implementation details from the {language} solution.
2. Test understanding of algorithm logic, edge cases, or optimizations used in the solution.
3. Include questions about completing or fixing code snippets related to the problem.
4. Be relevant to the given problem and not introduce unrelated concepts.

## PROBLEM STATEMENT

{problem_statement}

## {language} IMPLEMENTATION

{solution_content}

## OUTPUT FORMAT

Return a JSON object with a "questions" array holding exactly {count} items:
{
  "questions": [
    {
      "question": "Given the code snippet:\n\n```\n<relevant code snippet>\n```\n\nWhat is the correct implementation of <specific function or logic>?",
      "options": [
        {"option": "Code option 1", "isCorrect": false},
        {"option": "Code option 2", "isCorrect": true},
        {"option": "Code option 3", "isCorrect": false},
        {"option": "Code option 4", "isCorrect": false}
      ],
      "multiSelect": false,
      "explanation": "Why the correct option is correct"
    }
  ]
}

Exactly one option is correct unless "multiSelect" is true."#;

pub const UMPIRE_STAGE_TEMPLATE: &str = r#"Given the following problem statement and {language} implementation, generate {count} multiple-choice questions that test the interviewee's understanding of the problem based on the "{stage}" step of the UMPIRE method.

## QUESTION REQUIREMENTS

1. Focus on the {stage} aspect of the problem.
2. Help the interviewee think about {stage}-related concepts or challenges.
3. Be relevant to the given problem and not introduce new concepts.
4. Reference the {language} implementation where appropriate.

## PROBLEM STATEMENT

{problem_statement}

## {language} IMPLEMENTATION

{solution_content}

## OUTPUT FORMAT

Return a JSON object with a "questions" array holding exactly {count} items:
{
  "questions": [
    {
      "question": "The multiple-choice question text",
      "options": [
        {"option": "First option text", "isCorrect": true},
        {"option": "Second option text", "isCorrect": false},
        {"option": "Third option text", "isCorrect": false},
        {"option": "Fourth option text", "isCorrect": false}
      ],
      "multiSelect": false,
      "explanation": "Why the correct option is correct"
    }
  ]
}

Exactly one option is correct unless "multiSelect" is true."#;

/// Inputs substituted into a stage template.
pub struct PromptContext<'a> {
    pub stage: &'a str,
    pub count: usize,
    pub language: &'a str,
    pub problem_statement: &'a str,
    pub solution_content: &'a str,
}

pub fn template_for_stage(stage: &str) -> &'static str {
    if stage == IMPLEMENT_STAGE {
        IMPLEMENT_STAGE_TEMPLATE
    } else {
        UMPIRE_STAGE_TEMPLATE
    }
}

/// Fills the stage template in a single pass. Substituted values are never
/// rescanned, so braces in a stage name or problem text stay literal.
pub fn render_question_prompt(ctx: &PromptContext<'_>) -> String {
    let count = ctx.count.to_string();
    PLACEHOLDER_REGEX
        .replace_all(template_for_stage(ctx.stage), |captures: &Captures<'_>| {
            let value = match &captures[1] {
                "stage" => ctx.stage,
                "count" => count.as_str(),
                "language" => ctx.language,
                "problem_statement" => ctx.problem_statement,
                _ => ctx.solution_content,
            };
            value.to_string()
        })
        .into_owned()
}
