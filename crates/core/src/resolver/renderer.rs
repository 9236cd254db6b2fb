// Query template renderer.
//
// Substitutes the placeholders the engine owns and leaves everything else
// byte-for-byte untouched. Dialect placeholders such as {segments[N]:date},
// {filter[N]:column}, {lookback_start_sql}, and {date_filter:column} are
// reserved for a downstream dialect renderer; passing them through unchanged
// is what lets that collaborator stay outside the engine.

use crate::moniker::Moniker;

/// Render the reserved `query` config value for a parsed moniker.
///
/// Substitutions:
/// - `{segments[N]}` -> the N-th path segment (0-based)
/// - `{version_date}` -> the version value, only when it is a date version
/// - `{is_latest}` -> literal `"true"` / `"false"`
pub fn render_query(template: &str, moniker: &Moniker) -> String {
    let mut rendered = template.to_string();

    for (index, segment) in moniker.path.segments.iter().enumerate() {
        rendered = rendered.replace(&format!("{{segments[{index}]}}"), segment);
    }

    if let Some(date) = moniker.version_date() {
        rendered = rendered.replace("{version_date}", date);
    }

    let is_latest = if moniker.is_latest() { "true" } else { "false" };
    rendered.replace("{is_latest}", is_latest)
}
