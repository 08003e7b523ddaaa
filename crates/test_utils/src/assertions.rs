//! Custom Test Assertions
//!
//! Assertion helpers for pipeline results that print the offending stage and
//! status instead of a bare `Err(..)`.

use domain_sales::{
    ImportError, ImportToken, ProcessStatus, ReasonCode, SalesProcess, Stage, TransitionError,
};

/// Asserts the process sits at the given coordinates
pub fn assert_at(process: &SalesProcess, stage: Stage, status: ProcessStatus) {
    assert_eq!(
        (process.stage, process.status),
        (stage, status),
        "Expected {}/{} but process {} is {}/{}",
        stage,
        status,
        process.id,
        process.stage,
        process.status
    );
}

/// Asserts a transition was rejected for stage order
pub fn assert_invalid_order(result: &Result<SalesProcess, TransitionError>) {
    match result {
        Err(TransitionError::InvalidOrder { .. }) => {}
        Err(other) => panic!("Expected InvalidOrder, got {other}"),
        Ok(p) => panic!("Expected InvalidOrder, but transition succeeded to {}/{}", p.stage, p.status),
    }
}

/// Asserts a transition was rejected because the process is locked
pub fn assert_terminal(result: &Result<SalesProcess, TransitionError>) {
    match result {
        Err(TransitionError::Terminal { .. }) => {}
        Err(other) => panic!("Expected Terminal, got {other}"),
        Ok(p) => panic!("Expected Terminal, but transition succeeded to {}/{}", p.stage, p.status),
    }
}

/// Asserts the gate refused the import for the given reason
pub fn assert_not_ready(result: &Result<ImportToken, ImportError>, reason: ReasonCode) {
    match result {
        Err(ImportError::NotReady(actual)) => assert_eq!(
            *actual, reason,
            "Import refused for {actual} instead of {reason}"
        ),
        Ok(token) => panic!(
            "Expected NotReady({reason}), but a token was issued for {}",
            token.process_id()
        ),
    }
}
