// All LLM prompt templates for the career module.
// Placeholders in `{braces}` are filled with `str::replace` before sending.
// The recruiter system prompt lives in llm_client::prompts.

/// Job analysis. Replace `{job_description}`.
pub const JOB_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following job description for an applicant who wants to pass ATS screening.

JOB DESCRIPTION:
{job_description}

Return JSON with keys:
- job_title (string)
- company (string, empty if not stated)
- seniority (string: "entry", "mid", "senior", "lead", "executive" or "unknown")
- location (string, empty if not stated)
- required_skills (array of strings)
- preferred_skills (array of strings)
- keywords (array of strings: exact ATS keywords and phrases worth mirroring)
- responsibilities (array of strings)
- summary (string: two sentences on what the employer really wants)"#;

/// Resume rewrite. Replace `{job_analysis}` and `{resume_text}`.
pub const RESUME_REWRITE_PROMPT_TEMPLATE: &str = r###"Rewrite the candidate's resume so it is ATS-optimized for the analysed job.

JOB ANALYSIS (JSON):
{job_analysis}

ORIGINAL RESUME:
{resume_text}

Formatting rules:
- Output Markdown only, no code fences and no commentary.
- First line: "# " followed by the candidate's name.
- Use "## " for section headings: Professional Summary, Core Skills, Experience, Education, Certifications (omit empty sections).
- Use "- " bullets. Start each bullet with a strong verb and quantify impact where the original gives numbers.
- Mirror the job's keywords naturally where the candidate's experience supports them.
- Keep every employer, title, date, and qualification from the original. Do not invent any."###;

/// Cover letter. Replace `{job_analysis}` and `{resume_text}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a tailored cover letter for this candidate and job.

JOB ANALYSIS (JSON):
{job_analysis}

CANDIDATE RESUME:
{resume_text}

Rules:
- Plain text with paragraph breaks, 250 to 350 words, no code fences.
- Open with the exact role title and why the candidate fits it.
- Two short paragraphs of evidence drawn only from the resume, using the job's keywords.
- Close with a confident call to action and a sign-off with the candidate's name."#;

/// Follow-up emails. Replace `{job_analysis}`.
pub const FOLLOW_UP_EMAILS_PROMPT_TEMPLATE: &str = r#"Write a follow-up email strategy for an applicant to the job below.

JOB ANALYSIS (JSON):
{job_analysis}

Return JSON with key:
- emails (array of exactly 3 objects: subject (string), body (string), send_after (string, e.g. "3 days after applying"))

The three emails are: after submitting the application, after the interview, and a final polite check-in.
Keep each body under 150 words and leave [Your Name] as the signature placeholder."#;

/// Full career pack. Replace `{job_description}` and `{candidate_text}`.
pub const CAREER_PACK_PROMPT_TEMPLATE: &str = r#"JOB DESCRIPTION:
{job_description}

CANDIDATE PROFILE (CV / notes):
{candidate_text}

Produce:
1) A concise ATS-optimized CV tailored for the job.
2) A tailored cover letter.
3) A short list of interview prep questions and strong answers.
4) A gap analysis: missing skills/keywords + suggestions to improve.

Return JSON with keys:
- ats_cv (string, Markdown)
- cover_letter (string)
- interview_prep (array of objects: question, strong_answer)
- gap_analysis (object: missing_keywords (array of strings), suggestions (array of strings))"#;

/// LinkedIn profile suggestions. Replace `{candidate_text}`.
pub const LINKEDIN_PROMPT_TEMPLATE: &str = r#"Suggest LinkedIn profile improvements for this candidate.

CANDIDATE PROFILE (CV / notes):
{candidate_text}

Return JSON with keys:
- headline (string)
- about (string)
- experience_bullets (array of strings)
- skills (array of strings)
- keywords (array of strings)
- networking_message (string)"#;

/// Interview prep. Replace `{job_description}` and `{candidate_text}`.
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"Prepare this candidate for an interview for the job below.

JOB DESCRIPTION:
{job_description}

CANDIDATE PROFILE:
{candidate_text}

Return JSON with key:
- interview_prep (array of objects: question, strong_answer, follow_up, follow_up_answer)"#;
