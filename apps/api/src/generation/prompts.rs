// Placeholder tokens used by the prompt templates under `prompts/`.

pub const JOB_DESCRIPTION: &str = "{job_description}";
/// Resume placeholder in `ratings_prompt.txt`.
pub const RESUME_DATA: &str = "{resume_data}";
/// Resume placeholder in `job_questions_prompt.txt`.
pub const RESUME_DESCRIPTION: &str = "{resume_description}";
/// Resume placeholder in `cover_letter_prompt.txt`.
pub const JSON_DATA: &str = "{json_data}";

/// Replaces every placeholder in one left-to-right pass.
///
/// Substituted values are never rescanned, so a job description that happens to
/// contain `{resume_data}` is inserted literally.
pub fn fill_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = substitutions
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .filter_map(|(token, value)| rest.find(*token).map(|at| (at, *token, *value)))
            .min_by_key(|(at, _, _)| *at);

        match next {
            Some((at, token, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + token.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
