use crate::extractor::ExtractorConfig;

/// In-page JavaScript applying the selector policy inside the browser
pub struct ExtractionScript {
    source: String,
}

impl ExtractionScript {
    /// The script removes `remove_selectors`, returns the inner HTML of the
    /// first content selector match with enough text, and falls back to
    /// `document.body`. It evaluates to `{ html, selector }`.
    pub fn new(config: &ExtractorConfig) -> Self {
        let remove_selectors = js_string_list(&config.remove_selectors);
        let content_selectors = js_string_list(&config.content_selectors);
        let min_text_length = config.min_text_length;

        let source = format!(
            r#"
            (() => {{
                const removeSelectors = [{remove_selectors}];
                for (const selector of removeSelectors) {{
                    document.querySelectorAll(selector).forEach(el => el.remove());
                }}

                const contentSelectors = [{content_selectors}];
                for (const selector of contentSelectors) {{
                    for (const element of document.querySelectorAll(selector)) {{
                        if (element.innerText.trim().length >= {min_text_length}) {{
                            return {{ html: element.innerHTML, selector: selector }};
                        }}
                    }}
                }}

                const body = document.body;
                if (body) {{
                    return {{ html: body.innerHTML, selector: 'body' }};
                }}

                return {{ html: '', selector: null }};
            }})()
            "#
        );

        Self { source }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

fn js_string_list(values: &[String]) -> String {
    values
        .iter()
        .map(|s| format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_embeds_selectors() {
        let script = ExtractionScript::new(&ExtractorConfig::default());

        assert!(script.source().contains("removeSelectors"));
        assert!(script.source().contains("contentSelectors"));
        assert!(script.source().contains("'article'"));
        assert!(script.source().contains(">= 100"));
    }

    #[test]
    fn test_selectors_are_quoted() {
        let config = ExtractorConfig {
            content_selectors: vec!["a[title='x']".into()],
            ..Default::default()
        };
        let script = ExtractionScript::new(&config);

        assert!(script.source().contains(r"'a[title=\'x\']'"));
    }
}
