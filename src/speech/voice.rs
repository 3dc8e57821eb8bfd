//! Best-effort voice selection by language

use crate::host::Voice;

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Pick a voice for `language`: exact tag first, then same primary
/// language, else `None` so the engine uses its default.
pub fn select_voice(voices: &[Voice], language: Option<&str>) -> Option<Voice> {
    let language = language?;
    let normalized = language.replace('_', "-");

    voices
        .iter()
        .find(|v| v.lang.replace('_', "-").eq_ignore_ascii_case(&normalized))
        .or_else(|| {
            let wanted = primary_subtag(language);
            voices
                .iter()
                .find(|v| primary_subtag(&v.lang).eq_ignore_ascii_case(wanted))
        })
        .cloned()
}
