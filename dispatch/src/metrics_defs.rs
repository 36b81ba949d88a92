use shared::metrics_defs::{MetricDef, MetricType};

pub const ATTEMPT_DURATION: MetricDef = MetricDef {
    name: "dispatch.attempt.duration",
    metric_type: MetricType::Histogram,
    description: "Backend attempt duration in seconds. Tagged with operation, backend, outcome.",
};

pub const ATTEMPT_FAILURES: MetricDef = MetricDef {
    name: "dispatch.attempt.failures",
    metric_type: MetricType::Counter,
    description: "Failed backend attempts. Tagged with operation, backend, kind.",
};

pub const FALLBACK_SERVED: MetricDef = MetricDef {
    name: "dispatch.fallback.served",
    metric_type: MetricType::Counter,
    description: "Reads answered by the legacy backend after a transient primary failure. Tagged with operation.",
};

pub const ALL_METRICS: &[MetricDef] = &[ATTEMPT_DURATION, ATTEMPT_FAILURES, FALLBACK_SERVED];
