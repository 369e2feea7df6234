use regex::Regex;
use std::sync::LazyLock;

use super::ReportContext;

static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// Replace {{variable}} placeholders with values from the report context.
pub fn render(template: &str, ctx: &ReportContext) -> String {
    TEMPLATE_RE
        .replace_all(template, |caps: &regex::Captures| {
            resolve(&caps[1], ctx).unwrap_or_default()
        })
        .to_string()
}

fn resolve(name: &str, ctx: &ReportContext) -> Option<String> {
    match name {
        "package_name" => Some(ctx.package_name.clone()),
        "package_version" => Some(ctx.package_version.clone()),
        "filename" => Some(ctx.filename.clone()),
        "phone_model" => ctx.phone_model.clone(),
        "android_version" => ctx.android_version.clone(),
        "timestamp" => Some(ctx.received_at.timestamp().to_string()),
        _ => None,
    }
}
