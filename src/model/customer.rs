//! Customer records.

/// What kind of service a node requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerKind {
    /// Plain delivery fed from depot stock, resupplied by drone.
    Delivery,
    /// Pickup leg of a paired pickup/dropoff job.
    Pickup,
    /// Dropoff leg of a paired pickup/dropoff job.
    Dropoff,
    /// The depot itself (node id 0).
    Depot,
}

impl CustomerKind {
    /// Parses the instance-file type tag (`D`, `P`, `DL`, `DEPOT`).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "D" => Some(CustomerKind::Delivery),
            "P" => Some(CustomerKind::Pickup),
            "DL" => Some(CustomerKind::Dropoff),
            "DEPOT" => Some(CustomerKind::Depot),
            _ => None,
        }
    }

    /// Whether arrival at this node waits for the customer's ready time.
    pub fn waits_for_ready_time(self) -> bool {
        matches!(self, CustomerKind::Delivery | CustomerKind::Dropoff)
    }
}

/// A customer node (the depot is the node with id 0).
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// Node id; 0 is the depot, customers are 1..=n.
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub kind: CustomerKind,
    /// Earliest service time, in hours.
    pub ready_time: f64,
    /// Pairing id shared by a pickup and its dropoff; 0 when unpaired.
    pub pair_id: usize,
    /// Unit demand weight carried on the truck between pickup and dropoff.
    pub weight: f64,
}

impl Customer {
    pub fn new(id: usize, x: f64, y: f64, kind: CustomerKind, ready_time: f64, pair_id: usize) -> Self {
        Self {
            id,
            x,
            y,
            kind,
            ready_time,
            pair_id,
            weight: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(CustomerKind::parse("D"), Some(CustomerKind::Delivery));
        assert_eq!(CustomerKind::parse("P"), Some(CustomerKind::Pickup));
        assert_eq!(CustomerKind::parse("DL"), Some(CustomerKind::Dropoff));
        assert_eq!(CustomerKind::parse("DEPOT"), Some(CustomerKind::Depot));
        assert_eq!(CustomerKind::parse("X"), None);
    }

    #[test]
    fn test_ready_time_applies_to_deliveries_only() {
        assert!(CustomerKind::Delivery.waits_for_ready_time());
        assert!(CustomerKind::Dropoff.waits_for_ready_time());
        assert!(!CustomerKind::Pickup.waits_for_ready_time());
        assert!(!CustomerKind::Depot.waits_for_ready_time());
    }
}
