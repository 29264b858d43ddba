//! # HTML Presentation View
//!
//! A self-contained HTML page listing the document name, header facts and
//! payload fields in one of the document's languages. Pure: the caller
//! decides where the page goes.

use vds_core::{LanguageTag, SealError};
use vds_payload::{FieldExtension, PayloadField};

use crate::document::SealedDocument;

impl SealedDocument {
    /// Render the presentation view.
    ///
    /// An explicit `language` the document supports is used as is.
    /// Otherwise, when `use_default` is set, the first supported language
    /// is used.
    ///
    /// # Errors
    ///
    /// `UnsupportedLanguage` when no language can be chosen.
    pub fn build_html_view(&self, language: Option<&str>, use_default: bool) -> Result<String, SealError> {
        let language = self.presentation_language(language, use_default)?;
        let title = self.header().document_name(language).unwrap_or_default();

        let mut html = format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n",
            lang = escape(language.as_str()),
            title = escape(title),
        );

        html.push_str("<table class=\"seal-header\">\n");
        for (label, value) in [
            ("Format", self.format().to_string()),
            ("Manifest", format!("{} v{}", self.manifest_id(), self.manifest_version())),
            ("Authority", self.certificate_authority_id().to_string()),
            ("Country", self.certificate_authority_issuing_country().to_string()),
        ] {
            row(&mut html, label, &escape(&value));
        }
        html.push_str("</table>\n<table class=\"seal-payload\">\n");
        for field in self.payload() {
            row(&mut html, field.name(), &render_value(field));
        }
        html.push_str("</table>\n");

        if let Ok(report) = self.verification_report() {
            html.push_str("<table class=\"seal-verification\">\n");
            for (flag, value) in report.result.flags() {
                row(&mut html, flag, if value { "yes" } else { "no" });
            }
            row(&mut html, "trusted", if report.is_trusted() { "yes" } else { "no" });
            html.push_str("</table>\n");
        }
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }

    fn presentation_language(&self, requested: Option<&str>, use_default: bool) -> Result<&LanguageTag, SealError> {
        let supported = self.supported_languages();
        if let Some(requested) = requested {
            if let Ok(tag) = LanguageTag::new(requested) {
                if let Some(found) = supported.iter().find(|l| ***l == tag) {
                    return Ok(*found);
                }
            }
        }
        if use_default {
            if let Some(first) = supported.first() {
                return Ok(*first);
            }
        }
        Err(SealError::UnsupportedLanguage(
            requested.unwrap_or("<none>").to_string(),
        ))
    }
}

fn row(html: &mut String, label: &str, value_html: &str) {
    html.push_str(&format!("<tr><th>{}</th><td>{value_html}</td></tr>\n", escape(label)));
}

fn render_value(field: &PayloadField) -> String {
    match (field.extension(), field.value_as_binary()) {
        (Some(FieldExtension::Portrait), Ok(bytes)) if !bytes.is_empty() => format!(
            "<img alt=\"portrait\" src=\"data:application/octet-stream;base64,{}\">",
            field.value_to_string()
        ),
        _ => escape(&field.value_to_string()),
    }
}

/// Escape text for HTML element and attribute content.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_document;

    #[test]
    fn test_default_language_is_first_supported() {
        let html = sample_document().build_html_view(None, true).unwrap();
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<h1>Residence permit</h1>"));
    }

    #[test]
    fn test_explicit_language() {
        let html = sample_document().build_html_view(Some("fr"), false).unwrap();
        assert!(html.contains("<html lang=\"fr\">"));
        assert!(html.contains("Titre de séjour"));
    }

    #[test]
    fn test_unsupported_language() {
        let doc = sample_document();
        assert_eq!(
            doc.build_html_view(Some("de"), false).unwrap_err(),
            SealError::UnsupportedLanguage("de".into())
        );
        assert!(matches!(doc.build_html_view(None, false), Err(SealError::UnsupportedLanguage(_))));
        // falls back when allowed
        assert!(doc.build_html_view(Some("de"), true).unwrap().contains("lang=\"en\""));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = sample_document().build_html_view(None, true).unwrap();
        assert!(html.contains("DUPONT &lt;Jr&gt;"));
        assert!(!html.contains("<Jr>"));
        assert!(html.contains("data:application/octet-stream;base64,/9j/"));
    }

    #[test]
    fn test_rows_one_per_line() {
        let html = sample_document().build_html_view(None, true).unwrap();
        assert!(html.contains("\n<tr><th>Country</th><td>FR</td></tr>\n"));
        assert!(html.ends_with("</table>\n</body>\n</html>\n"));
    }

    #[test]
    fn test_unverified_view_has_no_verification_table() {
        let html = sample_document().build_html_view(None, true).unwrap();
        assert!(!html.contains("seal-verification"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
