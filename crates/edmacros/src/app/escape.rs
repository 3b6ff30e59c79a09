//! HTML escaping of the selected text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::app::registry::{Macro, MacroInfo};
use crate::domain::errors::MacroError;
use crate::domain::host::{Application, Document};
use crate::domain::model::Edit;

const TAB_ENTITY: &str = "&#009;";
const LINE_BREAK: &str = "<br>\n";
const NBSP_ENTITY: &str = "&nbsp;";

static SPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(" {2,}").expect("space run pattern is valid"));

/// Escape `text` for inclusion in HTML markup.
///
/// `&`, `"`, `<` and `>` become entity references in a single pass, so generated entities are
/// never escaped again. Tabs become `&#009;`, newlines become `<br>` followed by the newline, and
/// every space inside a run of two or more spaces becomes `&nbsp;`. Single spaces are kept.
pub fn escape_html(text: &str) -> String {
    let escaped = html_escape::encode_double_quoted_attribute(text)
        .replace('\t', TAB_ENTITY)
        .replace('\n', LINE_BREAK);

    if !escaped.contains("  ") {
        return escaped;
    }
    SPACE_RUN
        .replace_all(&escaped, |caps: &Captures| NBSP_ENTITY.repeat(caps[0].len()))
        .into_owned()
}

/// Macro replacing the selection with its HTML-escaped form.
#[derive(Debug, Clone)]
pub struct EscapeHtml {
    info: MacroInfo,
}

impl EscapeHtml {
    pub const ID: &'static str = "escape-html";

    pub fn new() -> Self {
        Self {
            info: MacroInfo::new(
                Self::ID,
                "Escape for HTML",
                "Replaces the selected text with a version escaped for HTML.",
            ),
        }
    }
}

impl Default for EscapeHtml {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for EscapeHtml {
    fn info(&self) -> &MacroInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut MacroInfo {
        &mut self.info
    }

    fn run(&self, doc: &mut dyn Document, _app: &mut dyn Application) -> Result<(), MacroError> {
        let text = doc
            .selected_text()
            .filter(|text| !text.is_empty())
            .ok_or(MacroError::NoSelection {
                context: "Error",
                hint: "Text must be selected to HTML-ify.",
            })?;

        let edit = Edit::replace_selection(doc.selection_start(), escape_html(&text));
        tracing::debug!(from = text.len(), to = edit.text().len(), "escaped selection");
        edit.apply(doc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::infra::buffer::FileBuffer;
    use crate::infra::host::HeadlessApp;

    #[test]
    fn escapes_markup_and_collapses_space_runs() {
        assert_eq!(
            escape_html("<b>hi</b>  there"),
            "&lt;b&gt;hi&lt;/b&gt;&nbsp;&nbsp;there"
        );
    }

    #[test]
    fn ampersand_is_escaped_once() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
        assert_eq!(escape_html("\"q\""), "&quot;q&quot;");
    }

    #[test]
    fn single_spaces_are_untouched() {
        assert_eq!(escape_html("a b c"), "a b c");
    }

    #[test]
    fn space_run_length_is_preserved() {
        assert_eq!(escape_html("x   y"), "x&nbsp;&nbsp;&nbsp;y");
        assert_eq!(escape_html("  "), "&nbsp;&nbsp;");
        assert_eq!(escape_html("a  b c    d"), "a&nbsp;&nbsp;b c&nbsp;&nbsp;&nbsp;&nbsp;d");
    }

    #[test]
    fn output_has_no_raw_special_characters() {
        let escaped = escape_html("if (a < b && c > \"d\") {\n\treturn;\n}");
        let without_breaks = escaped.replace("<br>", "");
        assert!(!without_breaks.contains(['<', '>', '"']));

        let entities = ["&amp;", "&lt;", "&gt;", "&quot;", "&#009;", "&nbsp;"];
        assert!(
            escaped
                .match_indices('&')
                .all(|(idx, _)| entities.iter().any(|entity| escaped[idx..].starts_with(entity)))
        );
    }

    #[test]
    fn tabs_and_newlines_render_as_markup() {
        assert_snapshot!(
            escape_html("fn main() {\n\tlet x = 1;\n}"),
            @r"
        fn main() {<br>
        &#009;let x = 1;<br>
        }
        "
        );
    }

    #[test]
    fn run_replaces_selection_and_reselects_output() {
        let mut doc = FileBuffer::from_text("before <i>x</i> after")
            .with_selection(7..15)
            .unwrap();
        let mut app = HeadlessApp::new();

        EscapeHtml::new().run(&mut doc, &mut app).unwrap();

        assert_eq!(doc.text(), "before &lt;i&gt;x&lt;/i&gt; after");
        assert_eq!(doc.selection_start(), 7);
        assert_eq!(doc.selection_end(), 7 + "&lt;i&gt;x&lt;/i&gt;".len());
        assert_eq!(doc.selected_text().as_deref(), Some("&lt;i&gt;x&lt;/i&gt;"));
    }

    #[test]
    fn run_without_selection_fails_without_mutation() {
        let mut doc = FileBuffer::from_text("<p>");
        let mut app = HeadlessApp::new();

        let err = EscapeHtml::new().run(&mut doc, &mut app).unwrap_err();

        assert!(matches!(err, MacroError::NoSelection { .. }));
        assert_eq!(doc.text(), "<p>");
        assert!(!doc.is_dirty());
    }
}
