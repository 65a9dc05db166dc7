use opentelemetry::{KeyValue, global, metrics::Counter};

fn outcome(ok: bool) -> [KeyValue; 1] {
    [KeyValue::new("outcome", if ok { "ok" } else { "failed" })]
}

/// Per-cycle counters, exported when an OTLP meter provider is installed
/// and no-ops otherwise.
pub struct CycleMetrics {
    captures: Counter<u64>,
    uploads: Counter<u64>,
    uploaded_bytes: Counter<u64>,
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleMetrics {
    pub fn new() -> Self {
        let meter = global::meter("drivecam");

        Self {
            captures: meter
                .u64_counter("drivecam.captures")
                .with_description("Still captures attempted")
                .build(),
            uploads: meter
                .u64_counter("drivecam.uploads")
                .with_description("Uploads attempted")
                .build(),
            uploaded_bytes: meter
                .u64_counter("drivecam.uploaded_bytes")
                .with_description("JPEG bytes accepted by remote storage")
                .with_unit("By")
                .build(),
        }
    }

    pub fn capture(&self, ok: bool) {
        self.captures.add(1, &outcome(ok));
    }

    pub fn upload_succeeded(&self, bytes: u64) {
        self.uploads.add(1, &outcome(true));
        self.uploaded_bytes.add(bytes, &[]);
    }

    pub fn upload_failed(&self) {
        self.uploads.add(1, &outcome(false));
    }
}
