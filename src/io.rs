//! Instance loading and solution reporting.
//!
//! Thin adapters around the solver core: a whitespace-delimited
//! instance-file parser and a serde-based JSON view of a finished
//! solution. Neither feeds anything back into the optimizer.

use crate::eval::truck_timeline;
use crate::model::{Customer, CustomerKind, Instance};
use crate::solution::Solution;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Depot used when the instance file carries no `DEPOT` record.
const DEFAULT_DEPOT: (f64, f64) = (10.0, 10.0);

/// Loads an instance file.
///
/// Format: one record per line, `id x y type ready_time pair_id`, with
/// `type` one of `D`, `P`, `DL`, `DEPOT` and `ready_time` in minutes.
/// Lines starting with `#` and blank lines are ignored. Malformed lines
/// are skipped with a warning on stderr, not treated as fatal.
pub fn load_instance(path: &Path) -> Result<Instance, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read instance file {}: {e}", path.display()))?;
    Ok(parse_instance(&text))
}

/// Parses instance text; see [`load_instance`] for the format.
pub fn parse_instance(text: &str) -> Instance {
    let mut depot = Customer::new(0, DEFAULT_DEPOT.0, DEFAULT_DEPOT.1, CustomerKind::Depot, 0.0, 0);
    let mut customers = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_record(line) {
            Some(customer) if customer.kind == CustomerKind::Depot => {
                depot.x = customer.x;
                depot.y = customer.y;
            }
            Some(customer) => customers.push(customer),
            None => {
                eprintln!("warning: skipping malformed instance line {}: {line}", lineno + 1);
            }
        }
    }

    Instance::new(depot, customers)
}

fn parse_record(line: &str) -> Option<Customer> {
    let mut fields = line.split_whitespace();
    let id: usize = fields.next()?.parse().ok()?;
    let x: f64 = fields.next()?.parse().ok()?;
    let y: f64 = fields.next()?.parse().ok()?;
    let kind = CustomerKind::parse(fields.next()?)?;
    let ready_minutes: f64 = fields.next()?.parse().ok()?;
    let pair_id: usize = fields.next()?.parse().ok()?;
    Some(Customer::new(id, x, y, kind, ready_minutes / 60.0, pair_id))
}

/// One truck stop in the report.
#[derive(Debug, Serialize)]
pub struct StopReport {
    pub customer: usize,
    pub arrival: f64,
    pub departure: f64,
}

#[derive(Debug, Serialize)]
pub struct TruckReport {
    pub truck: usize,
    pub stops: Vec<StopReport>,
}

#[derive(Debug, Serialize)]
pub struct DroneReport {
    pub items: Vec<usize>,
    pub truck: usize,
    pub meet_node: usize,
    pub depart: f64,
    #[serde(rename = "return")]
    pub return_time: f64,
    pub flight_time: f64,
}

/// JSON-serializable view of a finished solution.
#[derive(Debug, Serialize)]
pub struct SolutionReport {
    pub makespan: f64,
    pub trucks: Vec<TruckReport>,
    pub drones: Vec<DroneReport>,
}

/// Renders the timelines and drone trips of a solution.
pub fn solution_report(solution: &Solution) -> SolutionReport {
    let trucks = solution
        .truck_routes
        .iter()
        .enumerate()
        .map(|(truck, route)| TruckReport {
            truck,
            stops: truck_timeline(solution, route)
                .into_iter()
                .map(|stop| StopReport {
                    customer: stop.customer,
                    arrival: stop.arrival,
                    departure: stop.departure,
                })
                .collect(),
        })
        .collect();

    let drones = solution
        .drone_trips
        .iter()
        .map(|trip| DroneReport {
            items: trip.items.clone(),
            truck: trip.truck,
            meet_node: trip.meet_node,
            depart: trip.depart_time,
            return_time: trip.return_time,
            flight_time: trip.flight_time,
        })
        .collect();

    SolutionReport {
        makespan: solution.makespan,
        trucks,
        drones,
    }
}

/// Writes the solution report as pretty-printed JSON.
pub fn write_json(solution: &Solution, path: &Path) -> Result<(), String> {
    let report = solution_report(solution);
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("cannot serialize solution: {e}"))?;
    fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
}
