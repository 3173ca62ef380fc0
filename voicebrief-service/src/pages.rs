//! HTML for the two user-facing pages: the upload form and the result page.

/// Languages offered by the form. Codes are the bare Sarvam codes; the
/// client qualifies them with a region when calling the API.
const LANGUAGES: &[(&str, &str)] = &[
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("mr", "Marathi"),
    ("gu", "Gujarati"),
    ("pa", "Punjabi"),
    ("od", "Odia"),
];

const DEFAULT_LANGUAGE: &str = "hi";

/// Render the upload form.
pub fn upload_form() -> String {
    let options: String = LANGUAGES
        .iter()
        .map(|(code, name)| {
            let selected = if *code == DEFAULT_LANGUAGE {
                " selected"
            } else {
                ""
            };
            format!("<option value=\"{code}\"{selected}>{name}</option>")
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Voicebrief</title>
</head>
<body>
  <h1>Voicebrief</h1>
  <p>Upload a PDF to get a translated summary with a spoken audio clip.</p>
  <form method="post" action="/" enctype="multipart/form-data">
    <p>
      <label for="pdf_file">PDF document</label>
      <input type="file" id="pdf_file" name="pdf_file" accept=".pdf" required>
    </p>
    <p>
      <label for="language_code">Language</label>
      <select id="language_code" name="language_code">{options}</select>
    </p>
    <p><button type="submit">Summarize</button></p>
  </form>
</body>
</html>
"#
    )
}

/// Render the result page with the translated summary and audio player.
pub fn result_page(summary: &str, audio_url: &str) -> String {
    let summary = escape_html(summary);
    let audio_url = escape_html(audio_url);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Voicebrief — Summary</title>
</head>
<body>
  <h1>Summary</h1>
  <p>{summary}</p>
  <audio controls src="{audio_url}"></audio>
  <p><a href="/">Summarize another document</a></p>
</body>
</html>
"#
    )
}

/// Escape text for interpolation into HTML content or attribute values.
fn escape_html(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            c => c.to_string(),
        })
        .collect()
}
