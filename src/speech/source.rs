//! Narration source resolution

use crate::host::Surface;

/// Text page narration should read: a non-blank selection, else the
/// designated content regions, else the whole surface.
pub fn resolve_source(surface: &dyn Surface) -> String {
    if let Some(selection) = surface.selected_text() {
        if !selection.trim().is_empty() {
            return selection;
        }
    }

    let regions: Vec<String> = surface
        .content_region_text()
        .into_iter()
        .filter(|r| !r.trim().is_empty())
        .collect();
    if !regions.is_empty() {
        return regions.join(" ");
    }

    surface.surface_text()
}
