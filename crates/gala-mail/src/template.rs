//! Template substitution and email rendering
//!
//! `{{key}}` tokens are replaced in a single pass; unknown keys become the
//! empty string. [`render_email`] is the only render path, shared by the
//! preview endpoint and the send path, so a preview is exactly what gets sent.

use gala_common::codec::Variables;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// Literal patterns; a failure here is a programming error caught by the tests below.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("token pattern"));
static CTA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<a\s+data-cta="true""#).expect("cta pattern"));
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*?href="([^"]*)"[^>]*>(.*?)</a>"#).expect("anchor pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));
static BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>|</h[1-6]>|</li>").expect("break pattern"));

const CTA_STYLE: &str = "display:inline-block;padding:12px 24px;background-color:#1a1a2e;\
color:#ffffff;text-decoration:none;border-radius:4px;font-weight:600;";

/// Replace every `{{key}}` with its value. Runs once; substituted values are
/// never re-scanned for tokens.
pub fn substitute(template: &str, vars: &Variables) -> String {
    substitute_with(template, vars, |v| v.to_string())
}

fn substitute_with(template: &str, vars: &Variables, encode: impl Fn(&str) -> String) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures| {
            vars.get(&caps[1]).map(|v| encode(v)).unwrap_or_default()
        })
        .into_owned()
}

/// Plain link whose href is a variable
pub fn link_html(key: &str, text: &str) -> String {
    format!(r#"<a href="{{{{{key}}}}}">{}</a>"#, escape_html(text))
}

/// Call-to-action button whose href is a variable
pub fn cta_html(key: &str, text: &str) -> String {
    format!(r#"<a data-cta="true" href="{{{{{key}}}}}">{}</a>"#, escape_html(text))
}

pub fn escape_html(s: &str) -> String {
    v_htmlescape::escape(s).to_string()
}

fn unescape_html(s: &str) -> String {
    html_escape::decode_html_entities(s).replace('\u{a0}', " ")
}

/// Composer input: rich-text body plus envelope copy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraft {
    #[serde(default)]
    pub heading: Option<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub header_image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Render a draft for one recipient's variables
pub fn render_email(draft: &EmailDraft, vars: &Variables) -> RenderedEmail {
    let subject = substitute(&draft.subject, vars);
    let body = substitute_with(&style_ctas(&draft.body), vars, escape_html);
    let heading = draft
        .heading
        .as_deref()
        .map(|h| substitute(h, vars))
        .filter(|h| !h.trim().is_empty());

    let html = layout(&body, heading.as_deref(), draft.header_image_url.as_deref());
    let text = plain_text(heading.as_deref(), &body);
    RenderedEmail { subject, html, text }
}

fn style_ctas(body: &str) -> String {
    CTA
        .replace_all(body, format!(r#"<a data-cta="true" style="{CTA_STYLE}""#).as_str())
        .into_owned()
}

fn layout(body: &str, heading: Option<&str>, header_image_url: Option<&str>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<body style=\"margin:0;padding:0;background-color:#f4f4f7;\">\n\
<table role=\"presentation\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\">\n<tr><td align=\"center\">\n\
<table role=\"presentation\" width=\"600\" cellpadding=\"0\" cellspacing=\"0\" \
style=\"background-color:#ffffff;font-family:Helvetica,Arial,sans-serif;\">\n",
    );
    if let Some(url) = header_image_url.filter(|u| !u.trim().is_empty()) {
        html.push_str(&format!(
            "<tr><td><img src=\"{}\" width=\"600\" alt=\"\" style=\"display:block;width:100%;\"></td></tr>\n",
            escape_html(url)
        ));
    }
    if let Some(heading) = heading {
        html.push_str(&format!(
            "<tr><td style=\"padding:32px 40px 0;\"><h1 style=\"margin:0;font-size:24px;\">{}</h1></td></tr>\n",
            escape_html(heading)
        ));
    }
    html.push_str(&format!(
        "<tr><td style=\"padding:24px 40px 40px;font-size:16px;line-height:1.5;\">{body}</td></tr>\n"
    ));
    html.push_str("</table>\n</td></tr>\n</table>\n</body>\n</html>\n");
    html
}

fn plain_text(heading: Option<&str>, body_html: &str) -> String {
    let with_links = ANCHOR.replace_all(body_html, |caps: &Captures| {
        let text = TAG.replace_all(&caps[2], "");
        format!("{} ({})", text.trim(), &caps[1])
    });
    let with_breaks = BREAK.replace_all(&with_links, "\n");
    let stripped = unescape_html(&TAG.replace_all(&with_breaks, ""));

    let mut lines: Vec<&str> = Vec::new();
    for line in stripped.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let body = lines.join("\n");
    match heading {
        Some(h) => format!("{h}\n\n{body}"),
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_unknown_keys_render_empty() {
        assert_eq!(substitute("Hi {{nonexistent}}!", &Variables::new()), "Hi !");
    }

    #[test]
    fn test_substitute_tolerates_inner_whitespace() {
        let v = vars(&[("firstName", "Ada")]);
        assert_eq!(substitute("Dear {{ firstName }},", &v), "Dear Ada,");
    }

    #[test]
    fn test_single_pass() {
        let v = vars(&[("a", "{{b}}"), ("b", "boom")]);
        assert_eq!(substitute("{{a}}", &v), "{{b}}");
    }

    #[test]
    fn test_link_and_cta_keep_shape() {
        let v = vars(&[("editLink", "https://gala.test/register/edit?token=t1")]);
        let link = link_html("editLink", "Update your details");
        assert_eq!(link, r#"<a href="{{editLink}}">Update your details</a>"#);
        assert_eq!(
            substitute(&link, &v),
            r#"<a href="https://gala.test/register/edit?token=t1">Update your details</a>"#
        );
        assert_eq!(cta_html("activitiesLink", "Pick"), r#"<a data-cta="true" href="{{activitiesLink}}">Pick</a>"#);
    }

    #[test]
    fn test_render_escapes_values_in_html_only() {
        let draft = EmailDraft {
            heading: Some("Welcome {{firstName}}".into()),
            subject: "See you soon, {{firstName}}".into(),
            body: "<p>Company: {{company}}</p>".into(),
            header_image_url: None,
        };
        let v = vars(&[("firstName", "Tom & Jerry"), ("company", "<Acme>")]);
        let email = render_email(&draft, &v);
        assert_eq!(email.subject, "See you soon, Tom & Jerry");
        assert!(email.html.contains("Company: &lt;Acme&gt;"));
        assert!(email.html.contains("Welcome Tom &amp; Jerry"));
        assert_eq!(email.text, "Welcome Tom & Jerry\n\nCompany: <Acme>");
    }

    #[test]
    fn test_render_styles_cta_and_derives_text_links() {
        let draft = EmailDraft {
            subject: "Activities".into(),
            body: format!("<p>Choose below.</p><p>{}</p>", cta_html("activitiesLink", "Choose activities")),
            header_image_url: Some("https://cdn.gala.test/header.png".into()),
            ..EmailDraft::default()
        };
        let v = vars(&[("activitiesLink", "https://gala.test/activities?token=t1")]);
        let email = render_email(&draft, &v);
        assert!(email.html.contains(r#"<a data-cta="true" style="display:inline-block;"#));
        assert!(email.html.contains(r#"href="https:&#x2f;&#x2f;gala.test&#x2f;activities?token=t1""#));
        assert!(email.html.contains(r#"<img src="https:&#x2f;&#x2f;cdn.gala.test&#x2f;header.png""#));
        assert!(!email.html.contains("<h1"));
        assert_eq!(
            email.text,
            "Choose below.\nChoose activities (https://gala.test/activities?token=t1)"
        );
    }

    #[test]
    fn test_escape_and_plain_text_decode() {
        assert_eq!(escape_html(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;&#x2f;b&gt;");
        assert_eq!(unescape_html("Fish&nbsp;&amp;&nbsp;chips &#x27;n&#x27; more"), "Fish & chips 'n' more");

        let draft = EmailDraft {
            subject: "s".into(),
            body: "<p>{{company}} &amp; friends</p>".into(),
            ..EmailDraft::default()
        };
        let email = render_email(&draft, &vars(&[("company", "O'Brien & Sons")]));
        assert!(email.html.contains("O&#x27;Brien &amp; Sons &amp; friends"));
        assert_eq!(email.text, "O'Brien & Sons & friends");
    }

    #[test]
    fn test_preview_equals_send() {
        let draft = EmailDraft {
            subject: "{{firstName}}".into(),
            body: "<p>{{editLink}}</p>".into(),
            ..EmailDraft::default()
        };
        let v = vars(&[("firstName", "Ada"), ("editLink", "https://x")]);
        assert_eq!(render_email(&draft, &v), render_email(&draft, &v));
    }
}
