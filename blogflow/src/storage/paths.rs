//! Artifact key layout shared by all stages.

use crate::core::RunId;

/// Presence gates run creation.
pub const READY_FLAG: &str = "ready.json";
/// `{"daily": n}` run quota.
pub const FREQUENCY_POLICY: &str = "frequency.json";
/// Signals that theme/topic setup finished.
pub const BOOTSTRAP: &str = "bootstrap.json";
/// Prefix that holds every run folder.
pub const GENERATED_PREFIX: &str = "generated/";
/// Topics list consumed by the domain stage.
pub const TOPICS: &str = "generated/Topics.json";
/// Theme descriptor consumed by the domain stage.
pub const THEME: &str = "generated/Theme.json";
/// Ranked domain suggestions.
pub const DOMAIN_NAMES: &str = "generated/DomainNames.json";
/// Written after the integration stubs.
pub const BOOTSTRAP_DONE: &str = "generated/bootstrap.done.json";
/// File name of generated content inside a run folder.
pub const CONTENT_FILE: &str = "content.md";

/// Marker created by the scheduler.
#[must_use]
pub fn run_marker(run_id: &RunId) -> String {
    format!("generated/{run_id}/.run")
}

/// Content artifact of a run.
#[must_use]
pub fn content(run_id: &RunId) -> String {
    format!("generated/{run_id}/{CONTENT_FILE}")
}

/// Publish result of a run.
#[must_use]
pub fn publish_result(run_id: &RunId) -> String {
    format!("generated/{run_id}/publish.json")
}

/// Logged metrics of a run.
#[must_use]
pub fn results(run_id: &RunId) -> String {
    format!("generated/{run_id}/results.json")
}

/// Stub document of a third-party integration.
#[must_use]
pub fn integration(name: &str) -> String {
    format!("integrations/{name}.json")
}

/// Extracts the run id from `generated/{run_id}/<name>`.
///
/// Returns `None` unless the key has exactly three non-empty segments and
/// starts with `generated`.
#[must_use]
pub fn run_id_from_artifact(key: &str) -> Option<RunId> {
    let segments: Vec<&str> = key.split('/').collect();
    match segments.as_slice() {
        ["generated", run_id, name] if !run_id.is_empty() && !name.is_empty() => {
            Some(RunId::new(*run_id))
        }
        _ => None,
    }
}

/// Distinct run ids found among `generated/` keys.
#[must_use]
pub fn run_ids_in(keys: &[String]) -> Vec<RunId> {
    let mut ids: Vec<RunId> = keys.iter().filter_map(|k| run_id_from_artifact(k)).collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_paths() {
        let id = RunId::new("R1");
        assert_eq!(run_marker(&id), "generated/R1/.run");
        assert_eq!(content(&id), "generated/R1/content.md");
        assert_eq!(publish_result(&id), "generated/R1/publish.json");
        assert_eq!(results(&id), "generated/R1/results.json");
        assert_eq!(integration("mailchimp"), "integrations/mailchimp.json");
    }

    #[test]
    fn test_run_id_from_artifact() {
        assert_eq!(run_id_from_artifact("generated/R1/content.md"), Some(RunId::new("R1")));
        assert_eq!(run_id_from_artifact("generated/DomainNames.json"), None);
        assert_eq!(run_id_from_artifact("generated//content.md"), None);
        assert_eq!(run_id_from_artifact("other/R1/content.md"), None);
        assert_eq!(run_id_from_artifact("generated/R1/nested/content.md"), None);
    }

    #[test]
    fn test_run_ids_in_dedups() {
        let keys = vec![
            "generated/B/.run".to_string(),
            "generated/A/.run".to_string(),
            "generated/A/content.md".to_string(),
            "generated/DomainNames.json".to_string(),
        ];
        assert_eq!(run_ids_in(&keys), vec![RunId::new("A"), RunId::new("B")]);
    }
}
