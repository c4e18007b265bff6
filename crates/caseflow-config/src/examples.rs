// caseflow-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for `caseflow.toml`. Output is deterministic and kept in
//! sync with [`crate::schema`] and [`crate::docs`].

/// Returns a canonical example `caseflow.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[ingress]
port = 7443

[workflow]
task_queue = "caseflow-orders"

[committee]
consensus_threshold = 0.66
confidence_threshold = 0.75
min_successful = 2
timeout_ms = 30000

[[committee.providers]]
id = "azure-openai-gpt4o"
family = "open_ai"
weight = 0.91

[[committee.providers]]
id = "azure-anthropic-claude"
family = "anthropic"
weight = 0.94

[[committee.providers]]
id = "azure-deepseek-v3"
family = "deep_seek"
weight = 0.83

[retention]
days = 1825

[external_catalog]
base_url = "https://accounts.zoho.com"
credentials_ref = "vault://caseflow/zoho-oauth"

[blob]
container_prefix = "caseflow"
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaseflowConfig;

    #[test]
    fn example_parses_and_validates() {
        let mut config: CaseflowConfig =
            toml::from_str(&config_toml_example()).expect("example parses");
        config.validate().expect("example validates");
    }
}
