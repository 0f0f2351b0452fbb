//! # Batch Evaluator
//!
//! Evaluates a rule list into exactly one result per rule, in input order.
//! Nothing is retained between calls.

use super::evaluator::RuleEvaluator;
use crate::config::compile_time::execution::MAX_WORKER_THREADS;
use crate::config::CheckerPreferences;
use crate::logging::codes;
use crate::registry::RegistrySource;
use crate::types::{CheckResult, ComplianceRule};
use crate::{log_debug, log_success};
use std::panic;
use std::thread;
use std::time::Instant;

pub struct BatchEvaluator<'a, S: RegistrySource + ?Sized> {
    evaluator: RuleEvaluator<'a, S>,
    max_threads: usize,
}

impl<'a, S: RegistrySource + ?Sized> BatchEvaluator<'a, S> {
    /// Sequential evaluator with the presence check enabled
    pub fn new(source: &'a S) -> Self {
        Self {
            evaluator: RuleEvaluator::new(source),
            max_threads: 1,
        }
    }

    pub fn from_preferences(source: &'a S, preferences: &CheckerPreferences) -> Self {
        Self::new(source)
            .with_presence_check(preferences.advisory_presence_check)
            .with_max_threads(preferences.max_threads)
    }

    pub fn with_presence_check(mut self, enabled: bool) -> Self {
        self.evaluator = self.evaluator.with_presence_check(enabled);
        self
    }

    /// Clamped to `1..=MAX_WORKER_THREADS`
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    /// Evaluate every rule; per-rule failures never abort the batch
    pub fn check_all(&self, rules: &[ComplianceRule]) -> Vec<CheckResult> {
        let start = Instant::now();
        let workers = self.max_threads.min(rules.len()).max(1);

        let results = if workers == 1 {
            self.evaluate_chunk(rules, 0)
        } else {
            self.evaluate_parallel(rules, workers)
        };

        let compliant = results.iter().filter(|r| r.status().is_compliant()).count();
        let non_compliant = results.iter().filter(|r| r.status().is_non_compliant()).count();

        log_success!(
            codes::success::BATCH_EVALUATION_COMPLETE,
            "Batch evaluation complete",
            "rules" => results.len(),
            "compliant" => compliant,
            "non_compliant" => non_compliant,
            "not_evaluated" => results.len() - compliant - non_compliant,
            "workers" => workers,
            "duration_ms" => start.elapsed().as_millis()
        );

        results
    }

    fn evaluate_chunk(&self, rules: &[ComplianceRule], offset: usize) -> Vec<CheckResult> {
        rules
            .iter()
            .enumerate()
            .map(|(i, rule)| self.evaluator.evaluate_at(rule, offset + i))
            .collect()
    }

    /// Contiguous chunks on scoped threads, joined in chunk order
    fn evaluate_parallel(&self, rules: &[ComplianceRule], workers: usize) -> Vec<CheckResult> {
        let chunk_size = rules.len().div_ceil(workers);
        log_debug!("Evaluating rules in parallel",
            "workers" => workers,
            "chunk_size" => chunk_size
        );

        thread::scope(|scope| {
            let handles: Vec<_> = rules
                .chunks(chunk_size)
                .enumerate()
                .map(|(n, chunk)| scope.spawn(move || self.evaluate_chunk(chunk, n * chunk_size)))
                .collect();

            let mut results = Vec::with_capacity(rules.len());
            for handle in handles {
                match handle.join() {
                    Ok(chunk) => results.extend(chunk),
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            results
        })
    }
}
