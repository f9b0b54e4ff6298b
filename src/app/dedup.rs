use crate::app::models::Project;
use std::collections::HashMap;

/// Gives repeated names a numeric suffix: `api`, `api-2`, `api-3`.
///
/// The first occurrence in list order keeps its name. Later ones are
/// numbered by occurrence, so the outcome depends only on input order.
pub fn deduplicate_names(projects: &mut [Project]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for p in projects.iter() {
        *counts.entry(p.name.clone()).or_default() += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for p in projects.iter_mut() {
        if counts.get(&p.name).copied().unwrap_or(0) < 2 {
            continue;
        }
        let occurrence = seen.entry(p.name.clone()).or_default();
        *occurrence += 1;
        if *occurrence > 1 {
            p.name = format!("{}-{}", p.name, occurrence);
        }
    }
}
