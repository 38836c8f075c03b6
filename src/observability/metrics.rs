use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub match_requests_total: IntCounterVec,
    pub match_latency_seconds: HistogramVec,
    pub match_candidates_scored_total: IntCounter,
    pub match_history_write_failures_total: IntCounter,
    pub matches_returned: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let match_requests_total = IntCounterVec::new(
            Opts::new("match_requests_total", "Total match requests by outcome"),
            &["outcome"],
        )
        .expect("valid match_requests_total metric");

        let match_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "match_latency_seconds",
                "Latency of ride matching in seconds",
            ),
            &["outcome"],
        )
        .expect("valid match_latency_seconds metric");

        let match_candidates_scored_total = IntCounter::new(
            "match_candidates_scored_total",
            "Candidate rides scored across all requests",
        )
        .expect("valid match_candidates_scored_total metric");

        let match_history_write_failures_total = IntCounter::new(
            "match_history_write_failures_total",
            "Match history upserts that failed",
        )
        .expect("valid match_history_write_failures_total metric");

        let matches_returned = Histogram::with_opts(
            HistogramOpts::new("matches_returned", "Number of matches returned per request")
                .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 20.0]),
        )
        .expect("valid matches_returned metric");

        registry
            .register(Box::new(match_requests_total.clone()))
            .expect("register match_requests_total");
        registry
            .register(Box::new(match_latency_seconds.clone()))
            .expect("register match_latency_seconds");
        registry
            .register(Box::new(match_candidates_scored_total.clone()))
            .expect("register match_candidates_scored_total");
        registry
            .register(Box::new(match_history_write_failures_total.clone()))
            .expect("register match_history_write_failures_total");
        registry
            .register(Box::new(matches_returned.clone()))
            .expect("register matches_returned");

        Self {
            registry,
            match_requests_total,
            match_latency_seconds,
            match_candidates_scored_total,
            match_history_write_failures_total,
            matches_returned,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
