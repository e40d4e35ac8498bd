mod properties;
mod rng;
mod scenarios;
mod sim_time;

use crate::net::NetWorld;
use crate::sim::{ModelSpec, SimConfig, SimTime, Simulator};

pub(crate) fn spec(v: serde_json::Value) -> ModelSpec {
    serde_json::from_value(v).expect("valid model spec")
}

pub(crate) fn run(spec: &ModelSpec, seed: u64, until: SimTime) -> (Simulator, NetWorld) {
    let cfg = SimConfig {
        seed,
        ..SimConfig::default()
    };
    let mut sim = Simulator::default();
    let mut world = NetWorld::setup(spec, &cfg, &mut sim).expect("network builds");
    sim.run_until(until, &mut world);
    (sim, world)
}
