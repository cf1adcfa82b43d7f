// Prompt constants for keyword analysis.

/// System instruction sent with every analysis.
pub const ANALYSIS_SYSTEM: &str = "You are a helpful assistant who analyzes a resume \
    against a job description and outputs the matching keywords, the missing keywords, \
    and all resume keywords. \
    Respond with JSON that follows the provided schema and nothing else.";

/// Analysis prompt template. Replace `{job_description}` before sending.
/// The résumé itself travels as a PDF attachment next to this text.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the attached resume and the following job description to identify matching and missing keywords. Focus on technical skills, qualifications, and experience.
<JobDescription>
{job_description}
</JobDescription>
Provide an analysis that includes:
1. Keywords found in both the resume and job description
2. Important keywords from the job description that are missing in the resume
3. All keywords extracted from the resume"#;

pub fn build_analysis_prompt(job_description: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description.trim())
}
