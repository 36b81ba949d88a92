use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_COUNT: MetricDef = MetricDef {
    name: "gateway.request.count",
    metric_type: MetricType::Counter,
    description: "Handled API requests. Tagged with route, method, status.",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "gateway.request.duration",
    metric_type: MetricType::Histogram,
    description: "End-to-end request duration in seconds. Tagged with route, method, status.",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_COUNT, REQUEST_DURATION];
