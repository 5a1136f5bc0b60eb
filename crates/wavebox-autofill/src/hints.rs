//! Password field hint styling

const AUTOFILL_ICON: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path fill='%239e9e9e' d='M12 1 3 5v6c0 5.5 3.8 10.7 9 12 5.2-1.3 9-6.5 9-12V5l-9-4zm0 6a3 3 0 1 1 0 6 3 3 0 0 1 0-6z'/></svg>";
const AUTOFILL_HOVER_ICON: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path fill='%231976d2' d='M12 1 3 5v6c0 5.5 3.8 10.7 9 12 5.2-1.3 9-6.5 9-12V5l-9-4zm0 6a3 3 0 1 1 0 6 3 3 0 0 1 0-6z'/></svg>";

/// Stylesheet marking password inputs as autofillable
pub fn password_hint_css() -> String {
    format!(
        r#"input[type="password"] {{
  background-size: auto 24px;
  background-repeat: no-repeat;
  background-position: right center;
  background-image: url("{AUTOFILL_ICON}");
}}
input[type="password"]:hover {{
  background-size: auto 24px;
  background-repeat: no-repeat;
  background-position: right center;
  background-image: url("{AUTOFILL_HOVER_ICON}");
}}"#
    )
}

/// Script that installs the stylesheet once per document
pub(crate) fn password_hint_script() -> String {
    let css = serde_json::Value::String(password_hint_css()).to_string();
    format!(
        r#"(function() {{
  if (document.getElementById('__wavebox_autofill_hints')) return;
  const style = document.createElement('style');
  style.id = '__wavebox_autofill_hints';
  style.textContent = {css};
  (document.head || document.documentElement).appendChild(style);
}})();"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_targets_password_inputs() {
        let css = password_hint_css();
        assert!(css.contains(r#"input[type="password"]:hover"#));
        assert!(css.contains(AUTOFILL_HOVER_ICON));
    }

    #[test]
    fn test_script_embeds_css_as_string_literal() {
        let script = password_hint_script();
        assert!(script.contains("__wavebox_autofill_hints"));
        assert!(script.contains(r#"style.textContent = "input[type=\"password\"]"#));
    }
}
