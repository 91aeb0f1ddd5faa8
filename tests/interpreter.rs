//! End-to-end interpretation through the orchestrator, heuristics only.

use robotagent::agent::RobotAgent;
use robotagent::config::AppSettings;
use std::sync::Arc;

#[test]
fn pick_command_produces_full_pipeline_output() {
    let agent = RobotAgent::heuristic_only(Arc::new(AppSettings::default()));
    let response = agent.handle("pick up the bottle from the table");

    let lines: Vec<&str> = response.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "intent=pick; confidence=0.62; entities=[]");
    assert_eq!(lines[1], "objects=[\"bottle\"]; scene=on a table");
    assert!(lines[2].contains("close gripper"));
}

#[test]
fn stop_command_is_high_confidence() {
    let agent = RobotAgent::heuristic_only(Arc::new(AppSettings::default()));
    let response = agent.handle("emergency stop");
    assert!(response.starts_with("intent=stop; confidence=0.90"));
    assert!(response.contains("halt motion"));
}

#[test]
fn unclear_command_requests_clarification() {
    let agent = RobotAgent::heuristic_only(Arc::new(AppSettings::default()));
    let response = agent.handle("tell me a story");
    assert!(response.starts_with("intent=unknown"));
    assert!(response.contains("request clarification"));
}

#[test]
fn subagent_prompt_overrides_do_not_change_heuristics() {
    let mut settings = AppSettings::default();
    settings.agents.insert(
        "intent".to_string(),
        robotagent::config::AgentOverride {
            prompt_group: Some("custom-intent".to_string()),
            ..robotagent::config::AgentOverride::default()
        },
    );
    let agent = RobotAgent::heuristic_only(Arc::new(settings));
    let response = agent.handle("grab the nut");
    assert!(response.starts_with("intent=pick"));
}
