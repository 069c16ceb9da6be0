//! Text rendering for generated files and reports, using minijinja.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::manifest::ContentGaps;

/// One template's entry in the content gaps report.
#[derive(Debug, Clone, Serialize)]
struct GapEntry {
    path: String,
    sections: Vec<SectionGap>,
}

#[derive(Debug, Clone, Serialize)]
struct SectionGap {
    name: String,
    /// Display names, comma separated
    languages: String,
}

/// Renders the auto-generation notice and the content gaps report.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        env.add_template("notice.md", NOTICE_TEMPLATE)
            .expect("Failed to add notice template");
        env.add_template("content-gaps.md", GAPS_REPORT_TEMPLATE)
            .expect("Failed to add content gaps template");

        Self { env }
    }

    /// Comment placed at the top of every generated document.
    pub fn notice(&self, source: &str, command: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("notice.md")?
            .render(context! { source => source, command => command })
    }

    /// Human-readable rendering of the content gaps manifest.
    pub fn gaps_report(&self, gaps: &ContentGaps) -> Result<String, minijinja::Error> {
        let templates: Vec<GapEntry> = gaps
            .iter()
            .map(|(path, sections)| GapEntry {
                path: path.to_string(),
                sections: sections
                    .iter()
                    .map(|(name, languages)| SectionGap {
                        name: name.clone(),
                        languages: languages
                            .iter()
                            .map(|lang| lang.display_name())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
                    .collect(),
            })
            .collect();

        self.env.get_template("content-gaps.md")?.render(context! {
            templates => templates,
            total => gaps.total_gaps(),
        })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

const NOTICE_TEMPLATE: &str = r#"<!--
  AUTO-GENERATED FILE - DO NOT EDIT
  This file is generated from: {{ source }}
  To make changes, edit the template file, then run: {{ command }}
-->

"#;

const GAPS_REPORT_TEMPLATE: &str = r#"# Content Gaps Report

This report tracks missing sections in language-specific documentation.

**{{ templates|length }} template(s) have missing sections**

{% for template in templates %}## `{{ template.path }}`

{% for section in template.sections %}- **`{{ section.name }}`**: Missing in {{ section.languages }}
{% endfor %}
{% endfor %}## Summary

- **{{ templates|length }}** templates with gaps
- **{{ total }}** total missing sections
"#;
