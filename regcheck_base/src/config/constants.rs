pub mod compile_time {
    pub mod ingest {
        /// Maximum rule file size accepted for ingestion (10MB)
        /// SECURITY: Rule sets come from LLM extraction and are untrusted
        pub const MAX_RULE_FILE_SIZE: u64 = 10 * 1024 * 1024;

        /// Maximum number of flat rules in one rule set
        /// SECURITY: Bounds the number of registry lookups per batch
        pub const MAX_RULES_PER_SET: usize = 10_000;

        /// Name given to rules that arrive without one
        pub const UNNAMED_RULE: &str = "unnamed_rule";
    }

    pub mod registry {
        /// Maximum registry snapshot file size (50MB)
        /// SECURITY: Snapshots are loaded fully into memory
        pub const MAX_SNAPSHOT_FILE_SIZE: u64 = 50 * 1024 * 1024;

        /// Value name used in snapshots and diagnostics for a key's default value
        pub const DEFAULT_VALUE_LABEL: &str = "(Default)";
    }

    pub mod execution {
        /// Upper bound for batch worker threads
        /// RESOURCE: Registry reads are cheap local calls
        pub const MAX_WORKER_THREADS: usize = 64;
    }

    pub mod reporting {
        /// Longest observed value rendered in the text analysis
        pub const MAX_RENDERED_VALUE_LENGTH: usize = 256;
    }
}
