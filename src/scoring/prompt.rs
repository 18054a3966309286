// src/scoring/prompt.rs
use serde_json::Value;

/// Build the scoring prompt with both documents embedded as pretty JSON.
pub fn build_prompt(job_description: &Value, candidate: &Value) -> serde_json::Result<String> {
    let job_description = serde_json::to_string_pretty(job_description)?;
    let candidate = serde_json::to_string_pretty(candidate)?;

    Ok(format!(
        r#"
You are an AI-powered recruitment assistant. Your task is to score a candidate based on a given job description and their LinkedIn profile data.
The score should be between 0 and 100, where 100 is a perfect match.

Consider the following aspects for scoring:
- **Mandatory Skills:** High penalty if not present.
- **Weighted Skills:** Factor in the 'weight' of each skill from the JD.
- **Required Experience Years:** Assess the candidate's professional experience against this.
- **Required Education:** Match the candidate's education level.
- **Keywords:** Look for these keywords in 'about', 'description' fields within experience and education, and skill sections.
- **Overall Fit:** Evaluate the 'about' section and overall career trajectory for alignment with the role.

Return ONLY the score as an integer (e.g., 85). Do not include any other text or explanation.

Here is the Job Description:
{job_description}

Here is the Candidate's LinkedIn Profile Data:
{candidate}

score:
"#
    ))
}
