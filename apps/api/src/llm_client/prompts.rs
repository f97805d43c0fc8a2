// Prompt fragments for the advice feature.

/// System prompt for CV advice.
pub const CV_ADVICE_SYSTEM: &str = "Tu es un recruteur expérimenté. \
    Tu réponds en français, de façon concise et professionnelle. \
    Pas d'introduction ni de conclusion.";

/// User prompt template. `{job_title}` is replaced with the target role.
pub const CV_ADVICE_PROMPT_TEMPLATE: &str = "Donne-moi 3 conseils très brefs, percutants \
    et professionnels pour améliorer un CV de \"{job_title}\". Format liste à puces.";

pub fn cv_advice_prompt(job_title: &str) -> String {
    CV_ADVICE_PROMPT_TEMPLATE.replace("{job_title}", job_title.trim())
}
