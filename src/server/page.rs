//! Server-rendered prediction page

use std::fmt::Write;

use crate::data::{FeatureKind, FeatureSpec, FEATURES};
use crate::inference::Prediction;

use super::form::{FormError, FormValues};

pub const DISCLAIMER: &str = "Note: This tool is for demonstration purposes and not for medical diagnosis.";

/// What the page shows below the form
#[derive(Debug, Clone)]
pub enum PageOutcome<'a> {
    Idle,
    Result(&'a Prediction),
    Error(Vec<String>),
    /// No model loaded; the form is disabled
    Unavailable(&'a str),
}

impl<'a> PageOutcome<'a> {
    pub fn from_form_errors(errors: &[FormError]) -> Self {
        PageOutcome::Error(errors.iter().map(|e| e.message.clone()).collect())
    }
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#1f2933}
.columns{display:flex;gap:2rem}.columns>section{flex:1}
label{display:block;margin-top:.75rem;font-size:.9rem}
input,select{width:100%;padding:.35rem;margin-top:.2rem}
button{margin-top:1.5rem;padding:.6rem 1.4rem;font-size:1rem}
.result{margin-top:1.5rem;padding:1rem;border-radius:6px}
.alert{background:#fde2e2;color:#8a1c1c}.success{background:#def7e5;color:#1c6b35}
.error{background:#fff4de;color:#7a4b00}.info{margin-top:1.5rem;padding:1rem;background:#e3f0ff;border-radius:6px}
"#;

/// Render the full page
pub fn render_page(outcome: &PageOutcome<'_>, values: &FormValues) -> String {
    let disabled = matches!(outcome, PageOutcome::Unavailable(_));
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Heart IQ</title>\n");
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Heart Disease Prediction Tool</h1>\n");
    html.push_str("<p>Enter patient clinical data to predict the presence of heart disease.</p>\n");

    if let PageOutcome::Unavailable(reason) = outcome {
        let _ = writeln!(html, "<div class=\"result error\" role=\"alert\">{}</div>", escape(reason));
    }

    html.push_str("<h2>Patient Data Input</h2>\n");
    html.push_str("<form method=\"post\" action=\"/predict\">\n");
    let _ = writeln!(html, "<fieldset{}>", if disabled { " disabled" } else { "" });
    html.push_str("<div class=\"columns\">\n<section>\n<h3>Numerical Inputs</h3>\n");
    for spec in FEATURES.iter().filter(|s| s.is_numeric()) {
        render_field(&mut html, spec, values);
    }
    html.push_str("</section>\n<section>\n<h3>Categorical Inputs</h3>\n");
    for spec in FEATURES.iter().filter(|s| !s.is_numeric()) {
        render_field(&mut html, spec, values);
    }
    html.push_str("</section>\n</div>\n");
    html.push_str("<button type=\"submit\">Predict Diagnosis</button>\n");
    html.push_str("</fieldset>\n</form>\n");

    match outcome {
        PageOutcome::Result(prediction) => {
            let class = if prediction.label == "Presence" { "alert" } else { "success" };
            let _ = writeln!(
                html,
                "<div class=\"result {}\" id=\"result\"><h3>Prediction: {}</h3><p>Confidence Level: <strong>{}</strong></p></div>",
                class,
                escape(&prediction.label),
                prediction.confidence_percent()
            );
        }
        PageOutcome::Error(messages) => {
            html.push_str("<div class=\"result error\" id=\"result\" role=\"alert\"><h3>Could not make a prediction</h3><ul>\n");
            for message in messages {
                let _ = writeln!(html, "<li>{}</li>", escape(message));
            }
            html.push_str("</ul></div>\n");
        }
        PageOutcome::Idle | PageOutcome::Unavailable(_) => {}
    }

    let _ = writeln!(html, "<div class=\"info\">{}</div>", DISCLAIMER);
    html.push_str("</body>\n</html>\n");
    html
}

fn render_field(html: &mut String, spec: &FeatureSpec, values: &FormValues) {
    let current = values.display_value(spec);
    let _ = writeln!(html, "<label for=\"{0}\">{1}</label>", spec.form_name, escape(spec.label));

    match spec.kind {
        FeatureKind::Numeric { min, max, step, .. } => {
            let _ = writeln!(
                html,
                "<input type=\"number\" id=\"{0}\" name=\"{0}\" min=\"{1}\" max=\"{2}\" step=\"{3}\" value=\"{4}\" required>",
                spec.form_name,
                min,
                max,
                step,
                escape(&current)
            );
        }
        FeatureKind::Categorical { domain, .. } => {
            let _ = writeln!(html, "<select id=\"{0}\" name=\"{0}\">", spec.form_name);
            for option in domain {
                let value = option.to_string();
                let selected = if value == current { " selected" } else { "" };
                let _ = writeln!(html, "<option value=\"{0}\"{1}>{0}</option>", value, selected);
            }
            html.push_str("</select>\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, class_index: usize) -> Prediction {
        Prediction {
            label: label.to_string(),
            class_index,
            probabilities: vec![0.13, 0.87],
            confidence: 0.87,
        }
    }

    #[test]
    fn test_idle_page() {
        let html = render_page(&PageOutcome::Idle, &FormValues::default());
        assert!(html.contains("<title>Heart IQ</title>"));
        assert!(html.contains("Heart Disease Prediction Tool"));
        assert!(html.contains("Predict Diagnosis"));
        assert!(html.contains(DISCLAIMER));
        assert!(html.contains("name=\"st_depression\" min=\"0\" max=\"6.2\" step=\"0.1\" value=\"1\""));
        assert!(!html.contains("Prediction:"));
        assert!(!html.contains("<fieldset disabled>"));
    }

    #[test]
    fn test_result_styles() {
        let presence = prediction("Presence", 1);
        let html = render_page(&PageOutcome::Result(&presence), &FormValues::default());
        assert!(html.contains("class=\"result alert\""));
        assert!(html.contains("Prediction: Presence"));
        assert!(html.contains("Confidence Level: <strong>87.00%</strong>"));

        let absence = prediction("Absence", 0);
        let html = render_page(&PageOutcome::Result(&absence), &FormValues::default());
        assert!(html.contains("class=\"result success\""));
    }

    #[test]
    fn test_unavailable_disables_form() {
        let reason = "Model file 'model.json' not found! Please run the training script first.";
        let html = render_page(&PageOutcome::Unavailable(reason), &FormValues::default());
        assert!(html.contains("<fieldset disabled>"));
        assert!(html.contains("Model file &#39;model.json&#39; not found!"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }
}
