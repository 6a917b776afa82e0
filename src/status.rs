use serde::{Deserialize, Serialize};

/// Qualitative classification of a metric's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Perfect,
    Green,
    Yellow,
    Red,
    Grey,
    Missing,
    MissingSource,
}

impl Status {
    pub fn all() -> [Status; 7] {
        [
            Status::Red,
            Status::Missing,
            Status::MissingSource,
            Status::Yellow,
            Status::Grey,
            Status::Green,
            Status::Perfect,
        ]
    }

    /// Higher means more attention needed; used to sort dashboard rows.
    pub fn severity(self) -> u8 {
        match self {
            Status::Red => 6,
            Status::Missing => 5,
            Status::MissingSource => 4,
            Status::Yellow => 3,
            Status::Grey => 2,
            Status::Green => 1,
            Status::Perfect => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Perfect => "perfect",
            Status::Green => "green",
            Status::Yellow => "yellow",
            Status::Red => "red",
            Status::Grey => "grey",
            Status::Missing => "missing",
            Status::MissingSource => "missing_source",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            Status::Perfect | Status::Green => "○",
            Status::Grey => "◌",
            Status::Yellow | Status::Red => "●",
            Status::Missing | Status::MissingSource => "?",
        }
    }

    pub fn is_measured(self) -> bool {
        !matches!(self, Status::Missing | Status::MissingSource)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_red_first() {
        let mut statuses = vec![Status::Green, Status::Red, Status::Perfect, Status::Yellow];
        statuses.sort_by_key(|s| std::cmp::Reverse(s.severity()));
        assert_eq!(
            statuses,
            vec![Status::Red, Status::Yellow, Status::Green, Status::Perfect]
        );
    }

    #[test]
    fn serializes_snake_case() {
        let encoded = serde_json::to_string(&Status::MissingSource).unwrap();
        assert_eq!(encoded, "\"missing_source\"");
        assert_eq!(Status::MissingSource.to_string(), "missing_source");
    }

    #[test]
    fn missing_statuses_are_not_measured() {
        assert!(!Status::Missing.is_measured());
        assert!(!Status::MissingSource.is_measured());
        assert!(Status::Grey.is_measured());
    }
}
