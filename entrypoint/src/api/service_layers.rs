use std::time::Duration;

use tower::{
    ServiceBuilder,
    layer::util::{Identity, Stack},
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

// cold fetches can take up to the 30 second fetch timeout, only the wait
// for the response head is bounded here
const RESPONSE_TIMEOUT_SECONDS: u64 = 35;

type TraceHttpLayer = TraceLayer<SharedClassifier<ServerErrorsAsFailures>>;

pub(crate) fn build_service_layers()
-> ServiceBuilder<Stack<TimeoutLayer, Stack<TraceHttpLayer, Identity>>> {
    let trace_layer = TraceLayer::new_for_http();

    let timeout_layer = TimeoutLayer::new(Duration::from_secs(RESPONSE_TIMEOUT_SECONDS));

    ServiceBuilder::new().layer(trace_layer).layer(timeout_layer)
}
