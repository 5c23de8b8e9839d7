//! End-to-end hook flows over on-disk stores
//!
//! Each hook invocation in production is a fresh process, so most tests build
//! a new engine per event and rely only on what was persisted.

mod common;

use common::{edit_event, prompt_event, session_start_event, stop_event, TestProject};
use pro_workflow_core::{AdvisoryKind, HookOptions};

fn capture_options() -> HookOptions {
    HookOptions {
        learn_capture: true,
        ..Default::default()
    }
}

const ANNOTATED_RESPONSE: &str = "Fixed the flaky test.\n\
    [LEARN] Testing: Run the full suite before committing\n\
    Mistake: Committed with a failing test\n\
    Correction: Always run cargo test first";

#[tokio::test]
async fn test_captured_learning_surfaces_at_session_start() {
    let project = TestProject::new("billing-service");
    let transcript = project.write_transcript(&[ANNOTATED_RESPONSE]);

    let outcome = project
        .engine(capture_options())
        .handle(&stop_event("s1", Some(&transcript)))
        .await;
    assert_eq!(outcome.advisories.len(), 1);
    assert_eq!(outcome.advisories[0].kind, AdvisoryKind::Learning);
    assert_eq!(
        outcome.advisories[0].to_string(),
        "[pro-workflow] Captured 1 new learning(s) from [LEARN] tags."
    );

    let start = project
        .engine(HookOptions {
            load_learnings: true,
            ..Default::default()
        })
        .handle(&session_start_event("s2"))
        .await;
    let context = start.additional_context.expect("learnings context");
    assert!(context.starts_with("[pro-workflow] 1 learnings loaded for this project:"));
    assert!(context.contains("  [Testing] Run the full suite before committing"));

    let stored = project.engine(HookOptions::default()).learnings().all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].project, "billing-service");
    assert_eq!(stored[0].mistake.as_deref(), Some("Committed with a failing test"));
    assert_eq!(
        stored[0].correction.as_deref(),
        Some("Always run cargo test first")
    );
}

#[tokio::test]
async fn test_repeated_capture_counts_applications() {
    let project = TestProject::new("repeat");
    let transcript = project.write_transcript(&[ANNOTATED_RESPONSE]);

    project
        .engine(capture_options())
        .handle(&stop_event("s", Some(&transcript)))
        .await;
    let second = project
        .engine(capture_options())
        .handle(&stop_event("s", Some(&transcript)))
        .await;

    // Nothing new, so nothing to announce
    assert!(second.advisories.is_empty());

    let stored = project.engine(HookOptions::default()).learnings().all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].times_applied, 1);
}

#[tokio::test]
async fn test_stop_without_transcript_or_tags_is_silent() {
    let project = TestProject::new("quiet");
    let engine = project.engine(capture_options());

    assert!(engine.handle(&stop_event("s", None)).await.advisories.is_empty());

    let transcript = project.write_transcript(&["No annotations in here."]);
    let outcome = engine.handle(&stop_event("s", Some(&transcript))).await;
    assert!(outcome.advisories.is_empty());
    assert!(engine.learnings().all().await.is_empty());
}

#[tokio::test]
async fn test_corrupt_learnings_file_is_replaced() {
    let project = TestProject::new("corrupt");
    let data_dir = project.root().join(".claude").join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("learnings.json"), "{not json").unwrap();

    let transcript = project.write_transcript(&[ANNOTATED_RESPONSE]);
    let outcome = project
        .engine(capture_options())
        .handle(&stop_event("s", Some(&transcript)))
        .await;
    assert_eq!(outcome.advisories.len(), 1);

    let stored = project.engine(HookOptions::default()).learnings().all().await;
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_corrections_count_across_invocations() {
    let project = TestProject::new("corrections");
    let options = HookOptions {
        detect_corrections: true,
        ..Default::default()
    };

    let first = project
        .engine(options)
        .handle(&prompt_event("s", "That's wrong, revert it"))
        .await;
    let ordinary = project
        .engine(options)
        .handle(&prompt_event("s", "Add pagination to the list endpoint"))
        .await;
    let second = project
        .engine(options)
        .handle(&prompt_event("s", "Undo the last change"))
        .await;

    assert!(first.advisories[0].message.contains("(#1 this session)"));
    assert!(ordinary.advisories.is_empty());
    assert!(second.advisories[0].message.contains("(#2 this session)"));

    let state = project.engine(options).sessions().load("s").await;
    assert_eq!(state.corrections_count, 2);
}

#[tokio::test]
async fn test_drift_warning_after_enough_activity() {
    let project = TestProject::new("drift");
    let options = HookOptions {
        detect_drift: true,
        ..Default::default()
    };

    let opening = project
        .engine(options)
        .handle(&prompt_event("s", "build the user authentication login flow with sessions"))
        .await;
    assert!(opening.advisories.is_empty());

    for _ in 0..6 {
        project
            .engine(options)
            .handle(&edit_event("s", "src/auth.rs"))
            .await;
    }

    for _ in 0..4 {
        let outcome = project
            .engine(options)
            .handle(&prompt_event("s", "add session expiry to login"))
            .await;
        assert!(outcome.advisories.is_empty());
    }

    let drifted = project
        .engine(options)
        .handle(&prompt_event("s", "paint the dashboard colors purple"))
        .await;
    assert_eq!(drifted.advisories.len(), 1);
    assert_eq!(drifted.advisories[0].kind, AdvisoryKind::Drift);

    let message = &drifted.advisories[0].message;
    assert!(message.starts_with("Drift detected: current prompt has 0% relevance"));
    assert!(!message.contains('\n'));
    assert!(message.contains("(original keywords: authentication, build, flow, login, sessions, user)"));
}

#[tokio::test]
async fn test_drift_needs_edits() {
    let project = TestProject::new("no-edits");
    let options = HookOptions {
        detect_drift: true,
        ..Default::default()
    };

    project
        .engine(options)
        .handle(&prompt_event("s", "refactor the payment gateway"))
        .await;
    for _ in 0..8 {
        let outcome = project
            .engine(options)
            .handle(&prompt_event("s", "write release notes"))
            .await;
        assert!(outcome.advisories.is_empty());
    }

    let state = project.engine(options).drift().state("s").await.unwrap();
    assert_eq!(state.prompt_count, 9);
    assert!(state.original_keywords.contains("payment"));
}

#[tokio::test]
async fn test_wrap_up_reminder_every_twenty_responses() {
    let project = TestProject::new("reminder");
    let options = HookOptions {
        session_check: true,
        ..Default::default()
    };

    let mut reminders = Vec::new();
    for n in 1..=40 {
        let outcome = project.engine(options).handle(&stop_event("s", None)).await;
        if !outcome.advisories.is_empty() {
            reminders.push(n);
        }
    }

    assert_eq!(reminders, vec![20, 40]);
}

#[tokio::test]
async fn test_edit_scan_reports_findings() {
    let project = TestProject::new("scan");
    let src = project.root().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(
        src.join("app.js"),
        "console.log('debug');\nconst x = 1;\nconst apiKey = \"abcd1234efgh5678\";\n",
    )
    .unwrap();

    let engine = project.engine(HookOptions {
        scan_edits: true,
        ..Default::default()
    });
    let outcome = engine.handle(&edit_event("s", "src/app.js")).await;

    assert_eq!(outcome.advisories.len(), 1);
    let message = &outcome.advisories[0].message;
    assert!(message.starts_with("Post-edit scan of app.js:"));
    assert!(message.contains("  line 1: Debug: console.log statement"));
    assert!(message.contains("  line 3: SECURITY: potential hardcoded secret"));

    assert_eq!(engine.sessions().load("s").await.edit_count, 1);
}

#[tokio::test]
async fn test_prompts_are_stored_per_session() {
    let project = TestProject::new("prompts");
    let options = HookOptions {
        store_prompt: true,
        ..Default::default()
    };

    project.engine(options).handle(&prompt_event("a", "first")).await;
    project.engine(options).handle(&prompt_event("a", "second")).await;
    project.engine(options).handle(&prompt_event("b", "other")).await;

    let sessions = project.engine(options);
    assert_eq!(sessions.sessions().load("a").await.prompts, vec!["first", "second"]);
    assert_eq!(sessions.sessions().load("b").await.prompts, vec!["other"]);
}
