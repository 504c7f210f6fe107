//! Concourse build metadata from the environment of the `out` step.

/// The build metadata Concourse exports to resource containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    pub atc_external_url: String,
    pub team: String,
    pub pipeline: String,
    pub job: String,
    pub build_name: String,
    /// JSON object of pipeline instance vars; empty for plain pipelines.
    pub instance_vars: String,
}

impl BuildEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds from any key lookup; missing keys become empty strings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            atc_external_url: get("ATC_EXTERNAL_URL"),
            team: get("BUILD_TEAM_NAME"),
            pipeline: get("BUILD_PIPELINE_NAME"),
            job: get("BUILD_JOB_NAME"),
            build_name: get("BUILD_NAME"),
            instance_vars: get("BUILD_PIPELINE_INSTANCE_VARS"),
        }
    }

    /// Link to the build in the Concourse web UI.
    pub fn build_url(&self) -> String {
        let mut url = format!(
            "{}/teams/{}/pipelines/{}/jobs/{}/builds/{}",
            self.atc_external_url.trim_end_matches('/'),
            self.team,
            self.pipeline,
            self.job,
            self.build_name
        );
        if !self.instance_vars.is_empty() {
            url.push_str("?vars=");
            url.extend(url::form_urlencoded::byte_serialize(
                self.instance_vars.as_bytes(),
            ));
        }
        url
    }

    pub fn description(&self) -> String {
        format!("Build {}", self.build_name)
    }

    /// `<prefix>/<context>`, where context defaults to the job name.
    pub fn context(&self, prefix: Option<&str>, explicit: Option<&str>) -> String {
        let context = explicit
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.job);
        match prefix.filter(|p| !p.is_empty()) {
            Some(p) => format!("{}/{}", p, context),
            None => context.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> BuildEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BuildEnv::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn build_url_with_missing_names() {
        let e = env(&[
            ("ATC_EXTERNAL_URL", "https://cogito.invalid"),
            ("BUILD_JOB_NAME", "a-job"),
        ]);
        assert_eq!(
            e.build_url(),
            "https://cogito.invalid/teams//pipelines//jobs/a-job/builds/"
        );
        assert_eq!(e.description(), "Build ");
    }

    #[test]
    fn build_url_full() {
        let e = env(&[
            ("ATC_EXTERNAL_URL", "https://ci.example.com/"),
            ("BUILD_TEAM_NAME", "main"),
            ("BUILD_PIPELINE_NAME", "cogito"),
            ("BUILD_JOB_NAME", "unit"),
            ("BUILD_NAME", "42"),
        ]);
        assert_eq!(
            e.build_url(),
            "https://ci.example.com/teams/main/pipelines/cogito/jobs/unit/builds/42"
        );
        assert_eq!(e.description(), "Build 42");
    }

    #[test]
    fn build_url_with_instance_vars() {
        let e = env(&[
            ("ATC_EXTERNAL_URL", "https://ci.example.com"),
            ("BUILD_TEAM_NAME", "main"),
            ("BUILD_PIPELINE_NAME", "cogito"),
            ("BUILD_JOB_NAME", "unit"),
            ("BUILD_NAME", "7"),
            ("BUILD_PIPELINE_INSTANCE_VARS", r#"{"branch":"stable"}"#),
        ]);
        assert_eq!(
            e.build_url(),
            "https://ci.example.com/teams/main/pipelines/cogito/jobs/unit/builds/7?vars=%7B%22branch%22%3A%22stable%22%7D"
        );
    }

    #[test]
    fn context_defaults_to_job_and_takes_prefix() {
        let e = env(&[("BUILD_JOB_NAME", "a-job")]);
        assert_eq!(e.context(None, None), "a-job");
        assert_eq!(e.context(Some(""), Some("")), "a-job");
        assert_eq!(e.context(None, Some("lint")), "lint");
        assert_eq!(e.context(Some("ci"), None), "ci/a-job");
        assert_eq!(e.context(Some("ci"), Some("lint")), "ci/lint");
    }
}
