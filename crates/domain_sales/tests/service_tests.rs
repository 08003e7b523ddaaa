//! Tests for the pipeline service against the in-memory port

use std::sync::Arc;

use chrono::Duration;
use core_kernel::SalesProcessId;
use domain_sales::{
    AccessError, ImportError, MockSalesProcessPort, NewSalesProcess, PipelineError, ProcessFilter,
    ProcessStatus, ReasonCode, SalesPipelineService, SalesProcessEvent, Stage, TransitionError,
};
use rust_decimal_macros::dec;
use test_utils::{
    init_test_tracing, ActorFixtures, ConfigFixtures, QuoteBuilder, SalesProcessBuilder,
};

fn service_with(port: &Arc<MockSalesProcessPort>, config: domain_sales::PipelineConfig) -> SalesPipelineService {
    SalesPipelineService::new(port.clone(), config)
}

fn new_request() -> NewSalesProcess {
    NewSalesProcess {
        title: "  Fleet renewal 2025 ".to_string(),
        client_name: "Jordan Reyes".to_string(),
        company: Some("Reyes Logistics".to_string()),
        insurance_type: "motor".to_string(),
        responsible_person: Some("   ".to_string()),
        estimated_value: Some(dec!(18500.00)),
        ..Default::default()
    }
}

mod open_tests {
    use super::*;

    #[tokio::test]
    async fn test_open_process_persists_at_quote() {
        init_test_tracing();
        let port = Arc::new(MockSalesProcessPort::new());
        let service = service_with(&port, ConfigFixtures::strict());

        let outcome = service
            .open_process(&ActorFixtures::employee(), new_request())
            .await
            .unwrap();

        assert_eq!(outcome.process.stage, Stage::Quote);
        assert_eq!(outcome.process.status, ProcessStatus::Active);
        assert_eq!(outcome.process.title, "Fleet renewal 2025");
        assert_eq!(outcome.process.responsible_person, None);
        assert_eq!(outcome.process.version, 1);
        assert!(matches!(outcome.events.as_slice(), [SalesProcessEvent::Opened { .. }]));

        let listed = service
            .list_processes(&ActorFixtures::employee(), &ProcessFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, outcome.process.id);
    }

    #[tokio::test]
    async fn test_open_process_rejects_blank_title() {
        let port = Arc::new(MockSalesProcessPort::new());
        let service = service_with(&port, ConfigFixtures::strict());
        let request = NewSalesProcess {
            title: "   ".to_string(),
            ..new_request()
        };

        let result = service.open_process(&ActorFixtures::employee(), request).await;

        match result {
            Err(PipelineError::Validation(message)) => assert!(message.contains("title")),
            other => panic!("Expected validation error, got {:?}", other),
        }
        let listed = service
            .list_processes(&ActorFixtures::employee(), &ProcessFilter::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_open_process_rejects_negative_value() {
        let port = Arc::new(MockSalesProcessPort::new());
        let service = service_with(&port, ConfigFixtures::strict());
        let request = NewSalesProcess {
            estimated_value: Some(dec!(-1)),
            ..new_request()
        };

        let result = service.open_process(&ActorFixtures::employee(), request).await;
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }
}

mod advance_tests {
    use super::*;

    #[tokio::test]
    async fn test_advance_records_note_and_bumps_version() {
        init_test_tracing();
        let process = SalesProcessBuilder::new().at(Stage::Authorization).build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());

        let outcome = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Proposal, Some("Proposal sent"))
            .await
            .unwrap();

        assert_eq!(outcome.process.stage, Stage::Proposal);
        assert_eq!(outcome.process.version, 2);
        assert_eq!(outcome.process.notes.as_deref(), Some("Proposal sent"));
        match outcome.events.as_slice() {
            [SalesProcessEvent::StageAdvanced { from, to, .. }] => {
                assert_eq!(*from, Stage::Authorization);
                assert_eq!(*to, Stage::Proposal);
            }
            other => panic!("Unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_skipping_a_stage_is_rejected_under_strict_policy() {
        let process = SalesProcessBuilder::new().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::without_quote_check());

        let result = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Proposal, None)
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Transition(TransitionError::InvalidOrder {
                from: Stage::Quote,
                to: Stage::Proposal
            }))
        ));
    }

    #[tokio::test]
    async fn test_lenient_policy_allows_forward_jump() {
        let process = SalesProcessBuilder::new().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::lenient());

        let outcome = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Signed, None)
            .await
            .unwrap();
        assert_eq!(outcome.process.stage, Stage::Signed);

        let back = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Proposal, None)
            .await;
        assert!(matches!(back, Err(PipelineError::Transition(TransitionError::InvalidOrder { .. }))));
    }

    #[tokio::test]
    async fn test_leaving_quote_requires_selected_quote() {
        let process = SalesProcessBuilder::new().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        port.add_quote(QuoteBuilder::for_process(id).with_premium(dec!(1200)).build())
            .await;
        let service = service_with(&port, ConfigFixtures::strict());

        let result = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Authorization, None)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::Transition(TransitionError::NoSelectedQuote))
        ));

        port.add_quote(QuoteBuilder::for_process(id).selected().build()).await;
        let outcome = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Authorization, None)
            .await
            .unwrap();
        assert_eq!(outcome.process.stage, Stage::Authorization);
    }

    #[tokio::test]
    async fn test_lapsed_selection_does_not_count() {
        let process = SalesProcessBuilder::new().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let yesterday = (chrono::Utc::now() - Duration::days(1)).date_naive();
        port.add_quote(QuoteBuilder::for_process(id).selected().valid_until(yesterday).build())
            .await;
        let service = service_with(&port, ConfigFixtures::strict());

        let result = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Authorization, None)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::Transition(TransitionError::NoSelectedQuote))
        ));
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_a_conflict() {
        let process = SalesProcessBuilder::new().at(Stage::Proposal).build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process.clone()]).await);
        let service = service_with(&port, ConfigFixtures::strict());

        // Another client writes version 2 before this service reads
        let mut elsewhere = process.clone();
        elsewhere.append_note("Edited elsewhere");
        elsewhere.touch(chrono::Utc::now());
        port.force_store(elsewhere).await;

        let outcome = service
            .advance_stage(&ActorFixtures::employee(), id, Stage::Signed, None)
            .await
            .unwrap();
        assert_eq!(outcome.process.version, 3);
        assert_eq!(outcome.process.notes.as_deref(), Some("Edited elsewhere"));

        // A write built on version 1 is refused
        let port_write = domain_sales::SalesProcessPort::save_process(
            port.as_ref(),
            &process,
            process.version,
            None,
        )
        .await;
        assert!(port_write.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_advance_unknown_process() {
        let port = Arc::new(MockSalesProcessPort::new());
        let service = service_with(&port, ConfigFixtures::strict());
        let missing = SalesProcessId::new();

        let result = service
            .advance_stage(&ActorFixtures::employee(), missing, Stage::Authorization, None)
            .await;
        assert!(matches!(result, Err(PipelineError::NotFound(id)) if id == missing));
    }
}

mod status_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_locks_the_process() {
        let process = SalesProcessBuilder::new().at(Stage::Proposal).build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());
        let actor = ActorFixtures::employee();

        let outcome = service
            .set_status(&actor, id, ProcessStatus::Canceled, Some("Client went elsewhere"))
            .await
            .unwrap();
        assert_eq!(outcome.process.status, ProcessStatus::Canceled);

        let advance = service.advance_stage(&actor, id, Stage::Signed, None).await;
        assert!(matches!(
            advance,
            Err(PipelineError::Transition(TransitionError::Terminal { .. }))
        ));
        assert!(service.next_stages(&actor, id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_requires_concluded() {
        let process = SalesProcessBuilder::new().at(Stage::Signed).build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());

        let result = service
            .set_status(&ActorFixtures::employee(), id, ProcessStatus::Completed, None)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::Transition(TransitionError::InvalidStatusChange { .. }))
        ));
    }
}

mod import_tests {
    use super::*;

    #[tokio::test]
    async fn test_employee_cannot_import() {
        let process = SalesProcessBuilder::ready_for_import().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());

        let result = service.import_policy(&ActorFixtures::employee(), id).await;

        assert!(matches!(
            result,
            Err(PipelineError::Access(AccessError::MissingPermission { .. }))
        ));
        assert_eq!(port.policy_count().await, 0);
    }

    #[tokio::test]
    async fn test_import_not_ready_reports_reason() {
        let process = SalesProcessBuilder::new().at(Stage::Proposal).build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());

        let result = service.import_policy(&ActorFixtures::admin(), id).await;
        assert!(matches!(
            result,
            Err(PipelineError::Import(ImportError::NotReady(ReasonCode::StageIncomplete)))
        ));
        assert_eq!(port.policy_count().await, 0);
    }

    #[tokio::test]
    async fn test_import_creates_policy_once() {
        init_test_tracing();
        let process = SalesProcessBuilder::ready_for_import()
            .with_value(Some(dec!(2400.00)))
            .build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());
        let admin = ActorFixtures::admin();

        let receipt = service.import_policy(&admin, id).await.unwrap();
        assert_eq!(receipt.process_id, id);
        assert!(matches!(
            receipt.events.as_slice(),
            [SalesProcessEvent::ImportRequested { .. }, SalesProcessEvent::Imported { .. }]
        ));

        let draft = port.policy(receipt.policy_id).await.unwrap();
        assert_eq!(draft.source_process_id, id);
        assert_eq!(draft.annual_premium, Some(dec!(2400.00)));

        let second = service.import_policy(&ActorFixtures::super_admin(), id).await;
        match second {
            Err(PipelineError::AlreadyImported { process_id, existing }) => {
                assert_eq!(process_id, id);
                assert_eq!(existing, receipt.policy_id.to_string());
            }
            other => panic!("Expected AlreadyImported, got {:?}", other),
        }
        assert_eq!(port.policy_count().await, 1);
    }

    #[tokio::test]
    async fn test_repeating_a_duplicate_import_never_succeeds() {
        let process = SalesProcessBuilder::ready_for_import().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());
        let admin = ActorFixtures::admin();

        service.import_policy(&admin, id).await.unwrap();

        for _ in 0..3 {
            let error = service.import_policy(&admin, id).await.unwrap_err();
            assert!(matches!(error, PipelineError::AlreadyImported { .. }));
            assert!(!error.is_retryable(), "{} must not be retried", error);
        }
        assert_eq!(port.policy_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_imports_create_one_policy() {
        init_test_tracing();
        let process = SalesProcessBuilder::ready_for_import().build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let service = service_with(&port, ConfigFixtures::strict());
        let admin = ActorFixtures::admin();
        let super_admin = ActorFixtures::super_admin();

        let (first, second) = tokio::join!(
            service.import_policy(&admin, id),
            service.import_policy(&super_admin, id),
        );

        let results = [first, second];
        let imported: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(imported.len(), 1);
        let rejected: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(rejected.len(), 1);
        match rejected[0] {
            PipelineError::AlreadyImported { process_id, existing } => {
                assert_eq!(*process_id, id);
                assert_eq!(*existing, imported[0].policy_id.to_string());
            }
            other => panic!("Expected AlreadyImported, got {:?}", other),
        }
        assert_eq!(port.policy_count().await, 1);
    }
}

mod view_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_and_summary() {
        let processes = vec![
            SalesProcessBuilder::new().with_title("Acme fleet").build(),
            SalesProcessBuilder::new().with_title("Bakery contents").at(Stage::Signed).build(),
            SalesProcessBuilder::ready_for_import().with_title("Acme warehouse").build(),
        ];
        let port = Arc::new(MockSalesProcessPort::with_processes(processes).await);
        let service = service_with(&port, ConfigFixtures::strict());
        let actor = ActorFixtures::employee();

        let signed = service
            .list_processes(&actor, &ProcessFilter::stage(Stage::Signed))
            .await
            .unwrap();
        assert_eq!(signed.len(), 1);
        assert_eq!(signed[0].title, "Bakery contents");

        let summary = service.summary(&actor).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.ready_for_import, 1);
        assert_eq!(summary.by_stage.get(&Stage::Quote), Some(&1));
    }

    #[tokio::test]
    async fn test_next_stages_follow_policy() {
        let process = SalesProcessBuilder::new().at(Stage::Authorization).build();
        let id = process.id;
        let port = Arc::new(MockSalesProcessPort::with_processes(vec![process]).await);
        let actor = ActorFixtures::employee();

        let strict = service_with(&port, ConfigFixtures::strict());
        assert_eq!(strict.next_stages(&actor, id).await.unwrap(), vec![Stage::Proposal]);

        let lenient = service_with(&port, ConfigFixtures::lenient());
        assert_eq!(
            lenient.next_stages(&actor, id).await.unwrap(),
            vec![Stage::Proposal, Stage::Signed, Stage::Concluded]
        );
    }
}
