//! Placeholder expansion for hook filter expressions.
//!
//! Filters such as `billing-{{env}}` select the remote application a hook
//! reports to. Rendering is strict: an unknown placeholder or a stray brace
//! fails the hook call instead of producing a partial filter.
use super::DeploymentEvent;
use anyhow::{anyhow, Result};
use regex::Regex;

pub fn render_filter(template: &str, event: &DeploymentEvent) -> Result<String> {
    let placeholder =
        Regex::new(r"\{\{\s*([A-Za-z_]+)\s*\}\}").expect("regex for filter placeholders");

    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for cap in placeholder.captures_iter(template) {
        let whole = cap.get(0).expect("capture group 0 always matches");
        let name = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
        let value = match name {
            "env" => event.env.as_str(),
            "service" => event.service.as_str(),
            "version" => event.version.as_str(),
            "user" => event.user.as_str(),
            other => {
                return Err(anyhow!(
                    "unknown placeholder {{{{{other}}}}} in filter {template:?}"
                ))
            }
        };
        push_literal(&mut rendered, &template[last..whole.start()], template)?;
        rendered.push_str(value);
        last = whole.end();
    }
    push_literal(&mut rendered, &template[last..], template)?;
    Ok(rendered)
}

fn push_literal(rendered: &mut String, literal: &str, template: &str) -> Result<()> {
    if literal.contains('{') || literal.contains('}') {
        return Err(anyhow!("unbalanced braces in filter {template:?}"));
    }
    rendered.push_str(literal);
    Ok(())
}
