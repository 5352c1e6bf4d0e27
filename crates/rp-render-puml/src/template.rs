//! Fixed PlantUML boilerplate and `${name}` substitution.

use std::collections::BTreeMap;

use crate::RenderError;

pub const SEQUENCE_TEMPLATE: &str = "@startuml
'https://plantuml.com/sequence-diagram

!pragma teoz true

hide footbox

${entities}

skinparam sequence {
    ArrowColor Black
    LifeLineBorderColor #000000
    LifeLineBackgroundColor #FFFFFF

    ParticipantBorderColor #000000
    ParticipantBackgroundColor #FFFFFF

    ParticipantFontColor #000000
}
${client} -> ${module} :
${sequence}
@enduml
";

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Replace every `${name}` in `template` with `values[name]`.
///
/// Substituted text is inserted literally and never rescanned. A `${`
/// without a closing brace is copied through unchanged.
///
/// # Errors
///
/// Returns [`RenderError::MissingPlaceholder`] for the first referenced name
/// that has no value.
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> Result<String, RenderError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            output.push_str(&rest[start..]);
            return Ok(output);
        };

        let name = &after_open[..end];
        let value = values
            .get(name)
            .ok_or_else(|| RenderError::MissingPlaceholder(name.to_string()))?;
        output.push_str(value);
        rest = &after_open[end + CLOSE.len_utf8()..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Placeholder names referenced by `template`, in order of first use.
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let name = &after_open[..end];
        if !names.contains(&name) {
            names.push(name);
        }
        rest = &after_open[end + CLOSE.len_utf8()..];
    }
    names
}
