//! # Single-Rule Evaluator
//!
//! Turns one [`ComplianceRule`] into one [`CheckResult`]. Evaluation never
//! fails: unreadable rules become `NotEvaluated`, read failures become
//! `NonCompliant` with the error text as the observed value.

use crate::logging::{self, codes};
use crate::registry::{PresenceChecker, ReadError, RegistryReader, RegistrySource};
use crate::types::{CheckResult, CheckType, ComplianceRule, ComplianceStatus, NotEvaluatedReason};
use crate::{log_error, log_success, log_warning};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Trimmed, case-sensitive textual comparison
pub fn values_match(observed: &str, expected: &str) -> bool {
    observed.trim() == expected.trim()
}

pub struct RuleEvaluator<'a, S: RegistrySource + ?Sized> {
    source: &'a S,
    presence_check: bool,
}

impl<'a, S: RegistrySource + ?Sized> RuleEvaluator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            presence_check: true,
        }
    }

    /// Enable or disable the advisory presence check before each read
    pub fn with_presence_check(mut self, enabled: bool) -> Self {
        self.presence_check = enabled;
        self
    }

    /// Evaluate one rule
    pub fn evaluate(&self, rule: &ComplianceRule) -> CheckResult {
        if let Some(defect) = &rule.ingest_defect {
            return self.not_evaluated(rule, NotEvaluatedReason::MalformedRule(defect.clone()));
        }

        // A blank key cannot address anything
        let key = rule.registry_key.as_deref().filter(|k| !k.trim().is_empty());
        match &rule.check_type {
            CheckType::Registry => match key {
                Some(key) => self.evaluate_registry(rule, key),
                None => self.not_evaluated(rule, NotEvaluatedReason::MissingRegistryKey),
            },
            other => self.not_evaluated(
                rule,
                NotEvaluatedReason::UnsupportedCheckType(other.as_str().to_string()),
            ),
        }
    }

    /// Evaluate with the rule's name and position attached to log events
    pub fn evaluate_at(&self, rule: &ComplianceRule, index: usize) -> CheckResult {
        logging::with_rule_context(&rule.name, index, || self.evaluate(rule))
    }

    fn evaluate_registry(&self, rule: &ComplianceRule, key: &str) -> CheckResult {
        let value_name = rule.effective_value_name();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if self.presence_check && !PresenceChecker::new(self.source).exists(key) {
                log_warning!(
                    codes::registry::KEY_NOT_PRESENT,
                    "Registry key not present, reading value anyway",
                    "key" => key
                );
            }
            RegistryReader::new(self.source).read_value(key, value_name)
        }));

        match outcome {
            Ok(Ok(observed)) => self.compare(rule, observed),
            Ok(Err(error)) => self.read_failed(rule, error),
            Err(payload) => {
                log_error!(
                    codes::evaluation::EVALUATOR_PANIC,
                    "Registry backend panicked during evaluation",
                    "key" => key,
                    "value" => value_name,
                    "panic" => panic_message(payload.as_ref())
                );
                CheckResult::new(rule.clone(), ComplianceStatus::NonCompliant, None)
            }
        }
    }

    fn compare(&self, rule: &ComplianceRule, observed: String) -> CheckResult {
        let status = if values_match(&observed, &rule.expected_value) {
            log_success!(codes::success::RULE_COMPLIANT, "Rule is compliant");
            ComplianceStatus::Compliant
        } else {
            log_error!(
                codes::evaluation::RULE_NON_COMPLIANT,
                "Observed value differs from expected value",
                "observed" => observed.trim(),
                "expected" => rule.expected_value.trim()
            );
            ComplianceStatus::NonCompliant
        };

        CheckResult::new(rule.clone(), status, Some(observed))
    }

    fn read_failed(&self, rule: &ComplianceRule, error: ReadError) -> CheckResult {
        let message = error.to_string();
        log_error!(error.code(), &message, "target" => error.target());
        CheckResult::new(rule.clone(), ComplianceStatus::NonCompliant, Some(message))
    }

    fn not_evaluated(&self, rule: &ComplianceRule, reason: NotEvaluatedReason) -> CheckResult {
        log_warning!(
            codes::evaluation::RULE_NOT_EVALUATED,
            "Rule not evaluated",
            "reason" => &reason
        );
        CheckResult::new(rule.clone(), ComplianceStatus::NotEvaluated(reason), None)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
