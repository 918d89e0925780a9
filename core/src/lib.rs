//! esperf-core: Engine, workers and shared types for search load runs
//!
//! This crate provides the pieces every other esperf crate builds on:
//!
//! - Run configuration and the immutable [`RunContext`]
//! - Core traits ([`SearchClient`], [`Sampler`], [`Recorder`])
//! - Per-request records and latency aggregation
//! - The [`Worker`] loop and the [`Engine`] that owns the worker pool
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod request;
pub mod response;
pub mod traits;
pub mod worker;

pub use config::*;
pub use engine::{aggregate_worker_stats, AggregatedStats, Engine, EngineBuilder, EngineState};
pub use error::*;
pub use metrics::*;
pub use request::*;
pub use response::*;
pub use traits::*;
pub use worker::{Worker, WorkerBuilder, WorkerStats, DEFAULT_TICK_INTERVAL};

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_context_from_json_inputs() {
        let config: LoadConfig = serde_json::from_str(
            r#"{"Threads":2,"Mins":1,"Hosts":["es:9200"],"Index":"logs","Type":"entry"}"#,
        )
        .unwrap();
        let conditions: ConditionSet = serde_json::from_str(
            r#"[{"ID":3,"Cond":{"query":{"term":{"user":"$user"}}}}]"#,
        )
        .unwrap();
        let substitutions: SubstitutionSet =
            serde_json::from_str(r#"{"user":["alice"]}"#).unwrap();

        let context = RunContext::new(config, conditions, substitutions).unwrap();

        assert_eq!(context.config.threads, 2);
        assert_eq!(context.conditions.as_slice()[0].id, Some(3));
        assert_eq!(
            context.conditions.as_slice()[0].body,
            json!({"query": {"term": {"user": "$user"}}})
        );
        assert_eq!(
            context.config.search_url("es:9200"),
            "http://es:9200/logs/entry/_search"
        );
    }

    #[test]
    fn test_config_error_converts_to_bench_error() {
        let err: BenchError = ConfigError::NoHosts.into();
        assert_eq!(err.kind, BenchErrorKind::Config);
        assert!(err.message.contains("host"));
    }

    #[test]
    fn test_record_from_response_row() {
        let response = SearchResponse::new(200, br#"{"hits":{"total":12}}"#.to_vec());
        let record = RequestRecord {
            condition_id: Some(1),
            status_code: Some(response.status_code),
            hits: response.total_hits().unwrap(),
            ..Default::default()
        };

        let row = record.to_row();
        assert_eq!(row.len(), ROW_COLUMNS);
        assert_eq!(row[6], "200");
        assert_eq!(row[7], "12");
    }
}
