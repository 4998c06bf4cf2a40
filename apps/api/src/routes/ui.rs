use axum::response::Html;

/// GET /
/// Single-page form posting to the cover letter endpoint.
pub async fn index_handler() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Cover Letter Generator</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; max-width: 48rem; color: #1d1d1f; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input, textarea { width: 100%; padding: 0.5rem; }
    textarea { min-height: 6rem; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; }
    pre { background: #f6f8fa; padding: 1rem; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>Cover Letter Generator</h1>
  <p>Generate a personalized cover letter using your resume, the job description,
     company details, and relevant coursework or projects.</p>

  <form id="letterForm">
    <label>Upload Your Resume (PDF)</label>
    <input name="resume" type="file" accept=".pdf,.txt,.md" required />
    <label>Job Role</label>
    <input name="job_role" placeholder="E.g., Data Scientist, Fullstack Developer, etc." required />
    <label>Company Name</label>
    <input name="company_name" placeholder="Enter the name of the company you are applying to" required />
    <label>Company Context &amp; Job Description</label>
    <textarea name="company_context" placeholder="Provide a brief description of the company and the job role description" required></textarea>
    <label>Upload Relevant Coursework (PDF)</label>
    <input name="coursework" type="file" accept=".pdf,.txt,.md" />
    <button type="submit">Generate</button>
  </form>

  <h2>Generated Cover Letter</h2>
  <pre id="output"></pre>
  <button id="copyBtn" type="button">Copy</button>

  <script>
    const form = document.getElementById('letterForm');
    const output = document.getElementById('output');

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      output.textContent = 'Generating...';
      const res = await fetch('/api/v1/cover-letters', { method: 'POST', body: new FormData(form) });
      const data = await res.json();
      output.textContent = res.ok
        ? data.cover_letter
        : `${data.error.code}: ${data.error.message}`;
    });

    document.getElementById('copyBtn').addEventListener('click', () => {
      navigator.clipboard.writeText(output.textContent);
    });
  </script>
</body>
</html>"#,
    )
}
