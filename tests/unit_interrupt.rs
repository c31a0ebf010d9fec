// tests/unit_interrupt.rs
//! Lives in its own binary: the interrupt flag is process-wide.

use aidstats_core::dispatch::{clear_interrupt, dispatch, request_interrupt, Metric, Policy};
use aidstats_core::error::{Result, StatsError};
use aidstats_core::value::Value;

struct Probe;

fn ones(_ctx: &Probe) -> Result<Value> {
    Ok(Value::Count(1))
}

#[test]
fn an_interrupt_aborts_dispatch_instead_of_being_isolated() {
    let catalog: Vec<(&'static str, Metric<Probe>)> = vec![("ones", ones)];

    request_interrupt();
    let err = dispatch(&catalog, &Policy::AllExcept(&[]), &Probe, "in probe", false).unwrap_err();
    clear_interrupt();

    assert!(matches!(err, StatsError::Interrupted));
}
