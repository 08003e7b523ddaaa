//! Pre-built Test Fixtures
//!
//! Deterministic values so assertions can compare against literals.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{SalesProcessId, UserId};
use domain_sales::{Actor, PipelineConfig, Role, StagePolicy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Deterministic sales process ID
    pub fn process_id() -> SalesProcessId {
        SalesProcessId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440001))
    }

    pub fn employee_user() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440010))
    }

    pub fn admin_user() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440011))
    }

    pub fn super_admin_user() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440012))
    }
}

/// Fixture for the three brokerage roles
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn employee() -> Actor {
        Actor::new(IdFixtures::employee_user(), Role::Employee)
    }

    pub fn admin() -> Actor {
        Actor::new(IdFixtures::admin_user(), Role::Admin)
    }

    pub fn super_admin() -> Actor {
        Actor::new(IdFixtures::super_admin_user(), Role::SuperAdmin)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Creation time used by builders (Jan 15, 2025 09:00 UTC)
    pub fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    pub fn expected_close() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 6, 30)
    }
}

/// Fixture for estimated premium values
pub struct ValueFixtures;

impl ValueFixtures {
    pub fn small_business() -> Decimal {
        dec!(2400.00)
    }

    pub fn fleet() -> Decimal {
        dec!(18500.00)
    }
}

/// Fixture for service configurations
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Defaults: strict stages, selected quote required, admin imports
    pub fn strict() -> PipelineConfig {
        PipelineConfig::default()
    }

    /// Strict stages without the quote selection check
    pub fn without_quote_check() -> PipelineConfig {
        PipelineConfig {
            require_selected_quote: false,
            ..PipelineConfig::default()
        }
    }

    pub fn lenient() -> PipelineConfig {
        PipelineConfig {
            stage_policy: StagePolicy::Lenient,
            require_selected_quote: false,
            ..PipelineConfig::default()
        }
    }
}
